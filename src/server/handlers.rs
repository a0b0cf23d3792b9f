use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use weekplan_core::calendar;
use weekplan_core::placement::validate_blocks;
use weekplan_core::resolver::resolve_pattern_id;
use weekplan_core::{
    week_grid, DataExport, GridDay, Ingredient, MealBlock, Pattern, Recipe, RecipeIngredient,
    Settings, ShoppingItem, WeekOverride, WeekSource,
};

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::db::{
    CatalogRepository, IngredientRepository, OverrideRepository, PatternRepository,
    RecipeRepository, SettingsRepository,
};

pub const LAST_PATTERN_MESSAGE: &str = "You must keep at least one pattern.";

#[derive(Serialize)]
pub struct HealthResponse {
    ok: bool,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ----------------------------------------------------------------------------
// Ingredients
// ----------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct IngredientBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    unit: String,
}

pub async fn list_ingredients(State(state): State<AppState>) -> ApiResult<Json<Vec<Ingredient>>> {
    let ingredients = IngredientRepository::new(state.pool).list().await?;
    Ok(Json(ingredients))
}

pub async fn put_ingredient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<IngredientBody>,
) -> ApiResult<StatusCode> {
    let name = required("name", &body.name)?;
    let unit = required("unit", &body.unit)?;

    IngredientRepository::new(state.pool)
        .upsert(&Ingredient::new(&id, name, unit))
        .await?;
    tracing::info!(id = %id, "ingredient saved");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_ingredient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    IngredientRepository::new(state.pool).delete(&id).await?;
    tracing::info!(id = %id, "ingredient deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------------
// Recipes
// ----------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct RecipeBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    steps: Vec<String>,
}

pub async fn list_recipes(State(state): State<AppState>) -> ApiResult<Json<Vec<Recipe>>> {
    let recipes = RecipeRepository::new(state.pool).list().await?;
    Ok(Json(recipes))
}

pub async fn put_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RecipeBody>,
) -> ApiResult<StatusCode> {
    let name = required("name", &body.name)?;
    for line in &body.ingredients {
        if line.ingredient_id.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "Recipe ingredient is missing ingredientId".to_string(),
            ));
        }
        if !line.quantity.is_finite() || line.quantity < 0.0 {
            return Err(ApiError::BadRequest(format!(
                "Invalid quantity {} for ingredient {}",
                line.quantity, line.ingredient_id
            )));
        }
    }

    let recipe = Recipe::new(&id, name)
        .with_ingredients(body.ingredients)
        .with_steps(body.steps);
    RecipeRepository::new(state.pool).upsert(&recipe).await?;
    tracing::info!(id = %id, "recipe saved");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    RecipeRepository::new(state.pool).delete(&id).await?;
    tracing::info!(id = %id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------------
// Patterns
// ----------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    meal_blocks: Vec<MealBlock>,
}

pub async fn list_patterns(State(state): State<AppState>) -> ApiResult<Json<Vec<Pattern>>> {
    let patterns = PatternRepository::new(state.pool).list().await?;
    Ok(Json(patterns))
}

pub async fn put_pattern(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PatternBody>,
) -> ApiResult<StatusCode> {
    let name = required("name", &body.name)?;
    validate_blocks(&body.meal_blocks)?;

    let pattern = Pattern::new(&id, name).with_blocks(body.meal_blocks);
    PatternRepository::new(state.pool).upsert(&pattern).await?;
    tracing::info!(id = %id, blocks = pattern.meal_blocks.len(), "pattern saved");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_pattern(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let repo = PatternRepository::new(state.pool);
    if repo.get(&id).await?.is_some() && repo.count().await? <= 1 {
        return Err(ApiError::BadRequest(LAST_PATTERN_MESSAGE.to_string()));
    }
    repo.delete(&id).await?;
    tracing::info!(id = %id, "pattern deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------------
// Settings
// ----------------------------------------------------------------------------

pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<Settings>> {
    let settings = SettingsRepository::new(state.pool).get().await?;
    Ok(Json(settings))
}

pub async fn put_settings(
    State(state): State<AppState>,
    Json(mut settings): Json<Settings>,
) -> ApiResult<StatusCode> {
    if settings.has_duplicate_patterns() {
        return Err(ApiError::BadRequest(
            "Pattern order must not list a pattern twice".to_string(),
        ));
    }
    settings.pattern_start_date = settings.pattern_start_date.map(calendar::week_start);

    SettingsRepository::new(state.pool).save(&settings).await?;
    tracing::info!(
        start = ?settings.pattern_start_date,
        patterns = settings.pattern_order.len(),
        "settings saved"
    );
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------------
// Week overrides
// ----------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideBody {
    #[serde(default)]
    meal_blocks: Vec<MealBlock>,
}

pub async fn get_override(
    State(state): State<AppState>,
    Path(week): Path<String>,
) -> ApiResult<Json<WeekOverride>> {
    let date = calendar::from_iso_date(&week)?;
    OverrideRepository::new(state.pool)
        .get(date)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No override for the week of {}", week)))
}

pub async fn put_override(
    State(state): State<AppState>,
    Path(week): Path<String>,
    Json(body): Json<OverrideBody>,
) -> ApiResult<StatusCode> {
    let date = calendar::from_iso_date(&week)?;
    validate_blocks(&body.meal_blocks)?;

    let week = WeekOverride::new(date, body.meal_blocks);
    OverrideRepository::new(state.pool).upsert(&week).await?;
    tracing::info!(week = %week.week_start_date, "week override saved");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_override(
    State(state): State<AppState>,
    Path(week): Path<String>,
) -> ApiResult<StatusCode> {
    let date = calendar::from_iso_date(&week)?;
    OverrideRepository::new(state.pool).delete(date).await?;
    tracing::info!(week = %calendar::week_start(date), "week reset to pattern");
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------------
// Weeks
// ----------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekResponse {
    week_start: NaiveDate,
    label: String,
    source: WeekSource,
    /// Pattern the rotation assigns this week, even when overridden
    pattern_name: Option<String>,
    meal_blocks: Vec<MealBlock>,
    days: Vec<GridDay>,
}

pub async fn get_week(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Json<WeekResponse>> {
    let date = calendar::from_iso_date(&date)?;
    let catalog = CatalogRepository::new(state.pool).load().await?;

    let week = catalog.active_week(date);
    let pattern_name = resolve_pattern_id(date, &catalog.settings)
        .and_then(|id| catalog.pattern(id))
        .map(|p| p.name.clone());
    let days = week_grid(&week, &catalog.recipes);

    Ok(Json(WeekResponse {
        week_start: week.week_start,
        label: calendar::format_week_range(week.week_start),
        source: week.source,
        pattern_name,
        meal_blocks: week.blocks,
        days,
    }))
}

pub async fn get_shopping_list(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Json<Vec<ShoppingItem>>> {
    let date = calendar::from_iso_date(&date)?;
    let catalog = CatalogRepository::new(state.pool).load().await?;
    Ok(Json(catalog.shopping_list(date)))
}

// ----------------------------------------------------------------------------
// Export / import
// ----------------------------------------------------------------------------

pub async fn export_data(State(state): State<AppState>) -> ApiResult<Json<DataExport>> {
    let catalog = CatalogRepository::new(state.pool).load().await?;
    Ok(Json(catalog.into_export()))
}

pub async fn import_data(
    State(state): State<AppState>,
    Json(data): Json<DataExport>,
) -> ApiResult<StatusCode> {
    data.validate()?;
    CatalogRepository::new(state.pool).replace_all(&data).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn required<'a>(field: &str, value: &'a str) -> ApiResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(format!("Missing field: {}", field)));
    }
    Ok(trimmed)
}
