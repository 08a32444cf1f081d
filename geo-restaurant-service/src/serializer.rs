//! GeoJSON Feature mapping for [`Restaurant`] records.
//!
//! `ppoly` is the Feature geometry; every other field except `id` is a
//! property. Input is accepted either as a Feature (`"type": "Feature"` or a
//! `properties` member) or as a flat object keyed by field name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::geometry::{parse_multipoint, MultiPointGeometry};
use crate::models::{NewRestaurant, Restaurant, RestaurantChangeset};

pub const MAX_TEXT_LENGTH: usize = 50;

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FeatureType {
    Feature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FeatureCollectionType {
    FeatureCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RestaurantProperties {
    /// Name of the restaurant
    pub name: String,
    /// Rating score
    pub qualifications: i32,
    /// Operator of the restaurant
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RestaurantFeature {
    /// Unique identifier for the restaurant
    #[schema(read_only)]
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: FeatureType,
    /// Restaurant locations (`ppoly`), EPSG:4326
    pub geometry: MultiPointGeometry,
    pub properties: RestaurantProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RestaurantFeatureCollection {
    #[serde(rename = "type")]
    pub kind: FeatureCollectionType,
    pub features: Vec<RestaurantFeature>,
}

impl From<&Restaurant> for RestaurantFeature {
    fn from(restaurant: &Restaurant) -> Self {
        Self {
            id: restaurant.id,
            kind: FeatureType::Feature,
            geometry: MultiPointGeometry::from(&restaurant.ppoly),
            properties: RestaurantProperties {
                name: restaurant.name.clone(),
                qualifications: restaurant.qualifications,
                owner: restaurant.owner.clone(),
            },
        }
    }
}

impl FromIterator<RestaurantFeature> for RestaurantFeatureCollection {
    fn from_iter<I: IntoIterator<Item = RestaurantFeature>>(iter: I) -> Self {
        Self {
            kind: FeatureCollectionType::FeatureCollection,
            features: iter.into_iter().collect(),
        }
    }
}

/// Field name to messages. Serialized as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

/// Decodes a create payload; every field is required.
pub fn decode_new(data: &Value) -> Result<NewRestaurant, ValidationErrors> {
    let changeset = decode(data, false)?;
    changeset.into_new().ok_or_else(|| {
        let mut errors = ValidationErrors::default();
        errors.add(NON_FIELD_ERRORS, "Incomplete restaurant.");
        errors
    })
}

/// Decodes an update payload. With `partial`, absent fields are left out of
/// the changeset instead of being reported as missing.
pub fn decode(data: &Value, partial: bool) -> Result<RestaurantChangeset, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let fields = match flatten(data) {
        Ok(fields) => fields,
        Err(got) => {
            errors.add(
                NON_FIELD_ERRORS,
                format!("Invalid data. Expected a dictionary, but got {got}."),
            );
            return Err(errors);
        }
    };

    let mut changeset = RestaurantChangeset::default();

    if let Some(value) = field(&fields, "name", partial, &mut errors) {
        changeset.name = record(&mut errors, "name", decode_text(value));
    }
    if let Some(value) = field(&fields, "qualifications", partial, &mut errors) {
        changeset.qualifications = record(&mut errors, "qualifications", decode_integer(value));
    }
    if let Some(value) = field(&fields, "owner", partial, &mut errors) {
        changeset.owner = record(&mut errors, "owner", decode_text(value));
    }
    if let Some(value) = field(&fields, "ppoly", partial, &mut errors) {
        changeset.ppoly = record(&mut errors, "ppoly", parse_multipoint(value));
    }

    if errors.is_empty() {
        Ok(changeset)
    } else {
        Err(errors)
    }
}

/// Unnests a Feature into a flat field map. On failure returns the JSON type
/// name of the offending value.
fn flatten(data: &Value) -> Result<Map<String, Value>, &'static str> {
    let object = data.as_object().ok_or_else(|| json_type_name(data))?;
    let is_feature = object.contains_key("properties")
        || object.get("type").and_then(Value::as_str) == Some("Feature");
    if !is_feature {
        return Ok(object.clone());
    }

    let mut fields = match object.get("properties") {
        Some(properties) => properties
            .as_object()
            .ok_or_else(|| json_type_name(properties))?
            .clone(),
        None => Map::new(),
    };
    if let Some(geometry) = object.get("geometry") {
        fields.insert("ppoly".to_string(), geometry.clone());
    }
    Ok(fields)
}

/// Looks up a field, reporting missing and null values. Returns `None` when
/// there is nothing further to validate.
fn field<'a>(
    fields: &'a Map<String, Value>,
    name: &str,
    partial: bool,
    errors: &mut ValidationErrors,
) -> Option<&'a Value> {
    match fields.get(name) {
        None => {
            if !partial {
                errors.add(name, "This field is required.");
            }
            None
        }
        Some(Value::Null) => {
            errors.add(name, "This field may not be null.");
            None
        }
        Some(value) => Some(value),
    }
}

fn record<T>(errors: &mut ValidationErrors, name: &str, result: Result<T, String>) -> Option<T> {
    result.map_err(|message| errors.add(name, message)).ok()
}

fn decode_text(value: &Value) -> Result<String, String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err("Not a valid string.".to_string()),
    };

    if text.is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    if text.chars().count() > MAX_TEXT_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {MAX_TEXT_LENGTH} characters."
        ));
    }
    Ok(text)
}

fn decode_integer(value: &Value) -> Result<i32, String> {
    let invalid = || "A valid integer is required.".to_string();

    let number = match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i,
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e18 => f as i64,
            _ => return Err(invalid()),
        },
        Value::String(s) => {
            let s = s.trim();
            let s = match s.split_once('.') {
                Some((whole, zeros)) if zeros.bytes().all(|b| b == b'0') => {
                    whole
                }
                _ => s,
            };
            s.parse::<i64>().map_err(|_| invalid())?
        }
        _ => return Err(invalid()),
    };

    if number > i64::from(i32::MAX) {
        return Err(format!(
            "Ensure this value is less than or equal to {}.",
            i32::MAX
        ));
    }
    if number < i64::from(i32::MIN) {
        return Err(format!(
            "Ensure this value is greater than or equal to {}.",
            i32::MIN
        ));
    }
    Ok(number as i32)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
