//! Projection of product artifacts into flat records

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ProjectionError;
use crate::models::ProductRecord;

/// Artifact files in the output directory, in filename order.
pub async fn list_artifacts(dir: &Path) -> Result<Vec<PathBuf>, ProjectionError> {
    let io_error = |source| ProjectionError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_error)?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
        if entry.file_type().await.map_err(io_error)?.is_file() {
            paths.push(entry.path());
        }
    }

    paths.sort();
    Ok(paths)
}

pub async fn read_artifact(path: &Path) -> Result<Value, ProjectionError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ProjectionError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&contents).map_err(|source| ProjectionError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Flattens one product payload. Every field except the brand is required;
/// an absent, zero or empty brand becomes `None`.
pub fn project(json: &Value) -> Result<ProductRecord, ProjectionError> {
    let product = lookup(json, &["product"])?;
    let view_item = lookup(json, &["gtag", "events", "view_item"])?;

    let first_item = lookup(view_item, &["items"])?
        .as_array()
        .ok_or_else(|| ProjectionError::Malformed("view_item.items is not a list".to_string()))?
        .first()
        .ok_or_else(|| ProjectionError::Malformed("view_item.items is empty".to_string()))?;

    let brand_name = match product.get("brand") {
        Some(brand) if !is_empty(brand) => Some(render(lookup(brand, &["title"])?)),
        _ => None,
    };

    Ok(ProductRecord {
        product_id: field(product, &["id"])?,
        name: field(product, &["title"])?,
        weight: field(product, &["weight"])?,
        description: field(product, &["description"])?,
        available: field(product, &["stock", "available"])?,
        brand_name,
        price: field(product, &["price", "price"])?,
        currency: field(view_item, &["currency"])?,
        item_category: field(first_item, &["item_category"])?,
        tax: field(product, &["tax"])?,
        sku: field(product, &["sku"])?,
        variant: field(product, &["variant"])?,
    })
}

/// Text of a scalar as it appears in JSON, without quotes around strings
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn field(value: &Value, path: &[&str]) -> Result<String, ProjectionError> {
    lookup(value, path).map(render)
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Result<&'a Value, ProjectionError> {
    path.iter().try_fold(value, |current, key| match current {
        Value::Object(map) => map
            .get(*key)
            .ok_or_else(|| ProjectionError::MissingKey((*key).to_string())),
        _ => Err(ProjectionError::Malformed(format!(
            "expected an object holding `{key}`"
        ))),
    })
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::product_json;

    #[test]
    fn projects_every_column() {
        let record = project(&product_json(17, "Zyn Cool Mint", "ZYN-CM")).unwrap();

        assert_eq!(
            record,
            ProductRecord {
                product_id: "17".to_string(),
                name: "Zyn Cool Mint".to_string(),
                weight: "25".to_string(),
                description: "Nicotine pouches".to_string(),
                available: "true".to_string(),
                brand_name: Some("Zyn".to_string()),
                price: "4.95".to_string(),
                currency: "EUR".to_string(),
                item_category: "Pouches".to_string(),
                tax: "21".to_string(),
                sku: "ZYN-CM".to_string(),
                variant: "Strong".to_string(),
            }
        );
    }

    #[test]
    fn absent_brand_is_a_null_brand() {
        let mut json = product_json(1, "A", "SKU-A");
        json["product"].as_object_mut().unwrap().remove("brand");

        let record = project(&json).unwrap();
        assert_eq!(record.brand_name, None);

        json["product"]["brand"] = Value::Null;
        assert_eq!(project(&json).unwrap().brand_name, None);
    }

    #[test]
    fn zero_and_empty_brands_are_null_brands() {
        let mut json = product_json(1, "A", "SKU-A");

        for brand in [json!(0), json!(0.0), json!(false), json!(""), json!({})] {
            json["product"]["brand"] = brand;
            assert_eq!(project(&json).unwrap().brand_name, None);
        }

        json["product"]["brand"] = json!(3);
        assert!(project(&json).is_err());
    }

    #[test]
    fn missing_sku_drops_the_record() {
        let mut json = product_json(1, "A", "SKU-A");
        json["product"].as_object_mut().unwrap().remove("sku");

        match project(&json) {
            Err(ProjectionError::MissingKey(key)) => assert_eq!(key, "sku"),
            other => panic!("expected missing key, got {other:?}"),
        }
    }

    #[test]
    fn missing_nested_currency_names_the_key() {
        let mut json = product_json(1, "A", "SKU-A");
        json["gtag"]["events"]["view_item"]
            .as_object_mut()
            .unwrap()
            .remove("currency");

        assert!(matches!(
            project(&json),
            Err(ProjectionError::MissingKey(key)) if key == "currency"
        ));
    }

    #[test]
    fn empty_item_list_is_malformed() {
        let mut json = product_json(1, "A", "SKU-A");
        json["gtag"]["events"]["view_item"]["items"] = json!([]);

        assert!(matches!(project(&json), Err(ProjectionError::Malformed(_))));
    }

    #[test]
    fn non_object_payload_is_malformed() {
        assert!(matches!(
            project(&json!(["not", "a", "product"])),
            Err(ProjectionError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn lists_only_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2_b.json"), "{}").unwrap();
        std::fs::write(dir.path().join("1_a.json"), "{}").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let paths = list_artifacts(dir.path()).await.unwrap();

        assert_eq!(
            paths,
            vec![dir.path().join("1_a.json"), dir.path().join("2_b.json")]
        );
    }

    #[tokio::test]
    async fn truncated_artifact_fails_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("3_c.json");
        std::fs::write(&path, "{\n    \"product\": {").unwrap();

        assert!(matches!(
            read_artifact(&path).await,
            Err(ProjectionError::Decode { .. })
        ));
    }
}
