//! Raw allocation documents as stored by the persistence layer.
//!
//! These mirror the stored JSON closely and are read-only input to the
//! engine. Scalars that may be wrapped stay as `Ambiguous*` values until the
//! task builder resolves them. Text and list fields are decoded leniently: a
//! wrong-typed value becomes absent instead of failing the whole collection.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{normalize_number, AmbiguousDate, AmbiguousId, AmbiguousNumber};

/// One processing-result document produced by the task allocator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAllocationDocument {
    #[serde(rename = "_id", default, alias = "id")]
    pub id: Option<AmbiguousId>,
    #[serde(alias = "organizationId")]
    pub organization_id: AmbiguousId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub original_requirement: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub requirement_priority: Option<String>,
    #[serde(default)]
    pub requirement_deadline: Option<AmbiguousDate>,
    /// Generated feature specification; opaque to the engine
    #[serde(default)]
    pub feature_specification: Option<Value>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub allocations: Vec<RawAllocation>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<AmbiguousDate>,
    #[serde(default)]
    pub optimization_metrics: Option<RawOptimizationMetrics>,
}

/// One employee's share of a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAllocation {
    #[serde(default)]
    pub employee_id: Option<AmbiguousId>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub employee_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub employee_email: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub tasks: Vec<RawTaskEntry>,
    #[serde(default)]
    pub total_estimated_hours: Option<AmbiguousNumber>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub allocation_reasoning: Option<String>,
}

/// One task as originally authored by the allocator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTaskEntry {
    #[serde(default, alias = "_id")]
    pub id: Option<AmbiguousId>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub priority: Option<String>,
    #[serde(default)]
    pub estimated_duration_hours: Option<AmbiguousNumber>,
    #[serde(default)]
    pub due_date: Option<AmbiguousDate>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub assigned_to_email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_by_agent: Option<String>,
    #[serde(default, alias = "details", deserialize_with = "lenient_string")]
    pub detail: Option<String>,
    #[serde(default)]
    pub created_at: Option<AmbiguousDate>,
    #[serde(default)]
    pub updated_at: Option<AmbiguousDate>,
}

/// Allocator optimization metrics, still in wire form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOptimizationMetrics {
    #[serde(default)]
    pub total_tasks: Option<AmbiguousNumber>,
    #[serde(default)]
    pub total_estimated_hours: Option<AmbiguousNumber>,
    #[serde(default)]
    pub employees_utilized: Option<AmbiguousNumber>,
    #[serde(default)]
    pub average_workload_hours: Option<AmbiguousNumber>,
    #[serde(default)]
    pub workload_balance_score: Option<AmbiguousNumber>,
}

/// Optimization metrics with every field resolved to a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OptimizationMetrics {
    pub total_tasks: f64,
    pub total_estimated_hours: f64,
    pub employees_utilized: f64,
    pub average_workload_hours: f64,
    pub workload_balance_score: f64,
}

impl RawOptimizationMetrics {
    pub fn normalized(&self) -> OptimizationMetrics {
        OptimizationMetrics {
            total_tasks: normalize_number(self.total_tasks.as_ref()),
            total_estimated_hours: normalize_number(self.total_estimated_hours.as_ref()),
            employees_utilized: normalize_number(self.employees_utilized.as_ref()),
            average_workload_hours: normalize_number(self.average_workload_hours.as_ref()),
            workload_balance_score: normalize_number(self.workload_balance_score.as_ref()),
        }
    }
}

/// Decode a JSON array of allocation documents.
///
/// Fails only if the collection itself is not an array of objects carrying
/// an organization id; field-level problems degrade to defaults.
pub fn parse_documents(json: &str) -> Result<Vec<RawAllocationDocument>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Accept strings (and numbers, rendered as text); anything else is absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accept an array, dropping elements that fail to decode; anything else is empty.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        Some(Value::Array(items)) => items,
        Some(other) => {
            log::debug!("Expected an array, found {}; treating as empty", other);
            return Ok(Vec::new());
        }
        None => return Ok(Vec::new()),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                log::debug!("Skipping malformed entry: {}", e);
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_extended_json_document() {
        let doc: RawAllocationDocument = serde_json::from_value(json!({
            "_id": {"$oid": "65a1f0c2"},
            "organization_id": "org-1",
            "original_requirement": "Ship the billing page",
            "allocations": [{
                "employee_name": "Jane",
                "employee_email": "jane@co.com",
                "tasks": [{
                    "title": "Design schema",
                    "estimated_duration_hours": {"$numberInt": "8"},
                    "due_date": {"$date": {"$numberLong": "1704844800000"}},
                    "status": "pending"
                }],
                "total_estimated_hours": {"$numberDouble": "8.0"}
            }],
            "success": true,
            "created_at": {"$date": "2024-01-01T00:00:00Z"},
            "optimization_metrics": {"total_tasks": {"$numberInt": "1"}}
        }))
        .unwrap();

        assert_eq!(doc.allocations.len(), 1);
        assert_eq!(doc.allocations[0].tasks.len(), 1);
        assert_eq!(doc.allocations[0].tasks[0].title.as_deref(), Some("Design schema"));
        let metrics = doc.optimization_metrics.unwrap().normalized();
        assert_eq!(metrics.total_tasks, 1.0);
        assert_eq!(metrics.total_estimated_hours, 0.0);
    }

    #[test]
    fn wrong_typed_fields_degrade_to_absent() {
        let doc: RawAllocationDocument = serde_json::from_value(json!({
            "organization_id": "org-1",
            "error": {"code": 500},
            "allocations": [{
                "employee_email": ["not", "a", "string"],
                "tasks": [
                    "not a task",
                    {"title": 42, "status": null, "priority": true}
                ]
            }]
        }))
        .unwrap();

        let allocation = &doc.allocations[0];
        assert_eq!(doc.error, None);
        assert_eq!(allocation.employee_email, None);
        assert_eq!(allocation.tasks.len(), 1, "the string entry is skipped");
        assert_eq!(allocation.tasks[0].title.as_deref(), Some("42"));
        assert_eq!(allocation.tasks[0].priority, None);
    }

    #[test]
    fn null_or_scalar_collections_become_empty() {
        let doc: RawAllocationDocument = serde_json::from_value(json!({
            "organization_id": "org-1",
            "allocations": null
        }))
        .unwrap();
        assert!(doc.allocations.is_empty());

        let doc: RawAllocationDocument = serde_json::from_value(json!({
            "organization_id": "org-1",
            "allocations": [{"tasks": "none"}]
        }))
        .unwrap();
        assert!(doc.allocations[0].tasks.is_empty());
    }

    #[test]
    fn collection_without_org_id_is_rejected() {
        let result = parse_documents(r#"[{"allocations": []}]"#);
        assert!(result.is_err());
        assert!(parse_documents(r#"{"not": "an array"}"#).is_err());
    }
}
