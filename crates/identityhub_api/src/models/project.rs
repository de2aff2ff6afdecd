//! Jira project listings and create-meta payloads.

use serde::{Deserialize, Serialize};

use super::field::{deserialize_id, AllowedValue, IssueTypeSchema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub key: String,
    pub name: String,
}

impl Project {
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.key)
    }
}

/// Raw `jira/projects/{key}/metadata` response. Jira wraps the single requested project in a list.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMetadataResponse {
    #[serde(default)]
    pub projects: Vec<ProjectMetadata>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectMetadata {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub issuetypes: Vec<IssueType>,
}

impl ProjectMetadata {
    pub fn issue_type(&self, id: &str) -> Option<&IssueType> {
        self.issuetypes.iter().find(|issue_type| issue_type.id == id)
    }

    /// Priorities offered by the first issue type; Jira shares them across a project's types.
    pub fn priorities(&self) -> &[AllowedValue] {
        self.issuetypes
            .first()
            .map(IssueType::priorities)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IssueType {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: IssueTypeSchema,
}

impl IssueType {
    pub fn priorities(&self) -> &[AllowedValue] {
        self.fields
            .get("priority")
            .map(|field| field.options())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_exposes_issue_types_and_priorities() {
        let response: ProjectMetadataResponse = serde_json::from_value(json!({
            "projects": [{
                "key": "PROJ",
                "name": "Platform",
                "issuetypes": [{
                    "id": "10001",
                    "name": "Task",
                    "fields": {
                        "summary": { "name": "Summary", "required": true, "schema": { "type": "string", "system": "summary" } },
                        "priority": {
                            "name": "Priority",
                            "required": false,
                            "allowedValues": [{ "id": "1", "name": "Highest" }, { "id": "3", "name": "Medium" }],
                            "schema": { "type": "priority", "system": "priority" }
                        }
                    }
                }, {
                    "id": 10002,
                    "name": "Bug"
                }]
            }]
        }))
        .unwrap();

        let metadata = &response.projects[0];
        assert_eq!(metadata.issuetypes.len(), 2);
        assert_eq!(metadata.priorities()[1].id, "3");
        let bug = metadata.issue_type("10002").expect("bug issue type");
        assert!(bug.fields.is_empty());
        assert!(metadata.issue_type("99").is_none());
    }

    #[test]
    fn project_label_shows_name_and_key() {
        let project: Project =
            serde_json::from_value(json!({ "id": 10000, "key": "SEC", "name": "Security" })).unwrap();
        assert_eq!(project.id, "10000");
        assert_eq!(project.label(), "Security (SEC)");
    }
}
