//! Organizational scope model
//!
//! Facts and queries carry a position in the four-level tenant hierarchy
//! (platform ⊃ realm ⊃ formation ⊃ cell). Visibility flows from general to
//! specific only: a platform fact is visible to any cell, a cell fact is
//! never visible above its own level.

use crate::error::{KnowledgeError, Result};
use serde::{Deserialize, Serialize};

/// Hierarchy level, ordered platform < realm < formation < cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeLevel {
    Platform,
    Realm,
    Formation,
    Cell,
}

impl ScopeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeLevel::Platform => "platform",
            ScopeLevel::Realm => "realm",
            ScopeLevel::Formation => "formation",
            ScopeLevel::Cell => "cell",
        }
    }
}

/// Position of a fact or query in the tenant hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeScope {
    pub level: ScopeLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_id: Option<String>,
}

impl KnowledgeScope {
    pub fn platform() -> Self {
        Self {
            level: ScopeLevel::Platform,
            realm_id: None,
            formation_id: None,
            cell_id: None,
        }
    }

    pub fn realm(realm_id: impl Into<String>) -> Self {
        Self {
            level: ScopeLevel::Realm,
            realm_id: Some(realm_id.into()),
            formation_id: None,
            cell_id: None,
        }
    }

    pub fn formation(realm_id: impl Into<String>, formation_id: impl Into<String>) -> Self {
        Self {
            level: ScopeLevel::Formation,
            realm_id: Some(realm_id.into()),
            formation_id: Some(formation_id.into()),
            cell_id: None,
        }
    }

    pub fn cell(realm_id: impl Into<String>, cell_id: impl Into<String>) -> Self {
        Self {
            level: ScopeLevel::Cell,
            realm_id: Some(realm_id.into()),
            formation_id: None,
            cell_id: Some(cell_id.into()),
        }
    }

    /// Reject scopes missing the identifiers their level requires.
    ///
    /// `formation_id` is tolerated as absent on cell scopes; existing callers
    /// address cells by realm and cell id alone.
    pub fn validate(&self) -> Result<()> {
        let missing = |field: &str| {
            Err(KnowledgeError::Validation(format!(
                "{} scope requires {}",
                self.level.as_str(),
                field
            )))
        };

        match self.level {
            ScopeLevel::Platform => Ok(()),
            ScopeLevel::Realm => {
                if self.realm_id.is_none() {
                    return missing("realm_id");
                }
                Ok(())
            }
            ScopeLevel::Formation => {
                if self.realm_id.is_none() {
                    return missing("realm_id");
                }
                if self.formation_id.is_none() {
                    return missing("formation_id");
                }
                Ok(())
            }
            ScopeLevel::Cell => {
                if self.realm_id.is_none() {
                    return missing("realm_id");
                }
                if self.cell_id.is_none() {
                    return missing("cell_id");
                }
                Ok(())
            }
        }
    }

    /// Backend group id for this scope: level plus the identifiers present,
    /// colon-joined. Must stay bit-exact for interop with existing groups.
    pub fn group_id(&self) -> String {
        let mut parts = vec![self.level.as_str().to_string()];
        if let Some(id) = &self.realm_id {
            parts.push(id.clone());
        }
        if let Some(id) = &self.formation_id {
            parts.push(id.clone());
        }
        if let Some(id) = &self.cell_id {
            parts.push(id.clone());
        }
        parts.join(":")
    }

    /// Parse a backend group id back into a scope. Inverse of
    /// [`KnowledgeScope::group_id`] for well-formed groups.
    pub fn from_group_id(group: &str) -> Option<Self> {
        let mut parts = group.split(':');
        let level = parts.next()?;
        let ids: Vec<&str> = parts.collect();
        let take = |i: usize| ids.get(i).map(|s| s.to_string());
        match level {
            "platform" => Some(Self::platform()),
            "realm" => Some(Self {
                level: ScopeLevel::Realm,
                realm_id: take(0),
                formation_id: None,
                cell_id: None,
            }),
            "formation" => Some(Self {
                level: ScopeLevel::Formation,
                realm_id: take(0),
                formation_id: take(1),
                cell_id: None,
            }),
            "cell" => Some(Self {
                level: ScopeLevel::Cell,
                realm_id: take(0),
                formation_id: if ids.len() > 2 { take(1) } else { None },
                cell_id: take(ids.len().saturating_sub(1)),
            }),
            _ => None,
        }
    }

    /// Groups a query at this scope may read from: platform plus each
    /// ancestor group whose identifier is set.
    pub fn visible_groups(&self) -> Vec<String> {
        let mut groups = vec!["platform".to_string()];
        let realm = self.realm_id.as_deref().unwrap_or_default();
        let formation = self.formation_id.as_deref().unwrap_or_default();
        if let Some(id) = &self.realm_id {
            groups.push(format!("realm:{}", id));
        }
        if let Some(id) = &self.formation_id {
            groups.push(format!("formation:{}:{}", realm, id));
        }
        if let Some(id) = &self.cell_id {
            groups.push(format!("cell:{}:{}:{}", realm, formation, id));
        }
        groups
    }
}

/// Check whether a fact at `fact_scope` is visible to a query at
/// `query_scope`.
///
/// More general facts are always visible to more specific queries, never the
/// reverse. At equal level, every identifier from realm up to the fact's own
/// level must match.
pub fn is_visible(fact_scope: &KnowledgeScope, query_scope: &KnowledgeScope) -> bool {
    if fact_scope.level < query_scope.level {
        return true;
    }
    if fact_scope.level > query_scope.level {
        return false;
    }
    match fact_scope.level {
        ScopeLevel::Platform => true,
        ScopeLevel::Realm => fact_scope.realm_id == query_scope.realm_id,
        ScopeLevel::Formation => {
            fact_scope.realm_id == query_scope.realm_id
                && fact_scope.formation_id == query_scope.formation_id
        }
        ScopeLevel::Cell => {
            fact_scope.realm_id == query_scope.realm_id
                && fact_scope.formation_id == query_scope.formation_id
                && fact_scope.cell_id == query_scope.cell_id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_flows_downward_only() {
        let platform = KnowledgeScope::platform();
        let realm = KnowledgeScope::realm("trading");
        let cell = KnowledgeScope::cell("trading", "c1");

        assert!(is_visible(&platform, &realm));
        assert!(is_visible(&platform, &cell));
        assert!(is_visible(&realm, &cell));

        assert!(!is_visible(&cell, &platform));
        assert!(!is_visible(&cell, &realm));
        assert!(!is_visible(&realm, &platform));
    }

    #[test]
    fn test_same_level_requires_matching_ids() {
        assert!(is_visible(
            &KnowledgeScope::platform(),
            &KnowledgeScope::platform()
        ));
        assert!(is_visible(
            &KnowledgeScope::realm("trading"),
            &KnowledgeScope::realm("trading")
        ));
        assert!(!is_visible(
            &KnowledgeScope::realm("trading"),
            &KnowledgeScope::realm("research")
        ));

        let f1 = KnowledgeScope::formation("trading", "alpha");
        let f2 = KnowledgeScope::formation("trading", "beta");
        let f3 = KnowledgeScope::formation("research", "alpha");
        assert!(is_visible(&f1, &f1.clone()));
        assert!(!is_visible(&f1, &f2));
        assert!(!is_visible(&f1, &f3));

        let c1 = KnowledgeScope::cell("trading", "c1");
        let c2 = KnowledgeScope::cell("trading", "c2");
        assert!(is_visible(&c1, &c1.clone()));
        assert!(!is_visible(&c1, &c2));
    }

    #[test]
    fn test_group_id_derivation() {
        assert_eq!(KnowledgeScope::platform().group_id(), "platform");
        assert_eq!(KnowledgeScope::realm("trading").group_id(), "realm:trading");
        assert_eq!(
            KnowledgeScope::formation("trading", "alpha").group_id(),
            "formation:trading:alpha"
        );
        // cell without formation_id skips the field entirely
        assert_eq!(
            KnowledgeScope::cell("trading", "c1").group_id(),
            "cell:trading:c1"
        );
    }

    #[test]
    fn test_visible_groups() {
        assert_eq!(
            KnowledgeScope::platform().visible_groups(),
            vec!["platform".to_string()]
        );

        let mut cell = KnowledgeScope::cell("trading", "c1");
        cell.formation_id = Some("alpha".to_string());
        assert_eq!(
            cell.visible_groups(),
            vec![
                "platform".to_string(),
                "realm:trading".to_string(),
                "formation:trading:alpha".to_string(),
                "cell:trading:alpha:c1".to_string(),
            ]
        );
    }

    #[test]
    fn test_group_id_round_trip() {
        for scope in [
            KnowledgeScope::platform(),
            KnowledgeScope::realm("trading"),
            KnowledgeScope::formation("trading", "alpha"),
            KnowledgeScope::cell("trading", "c1"),
        ] {
            assert_eq!(
                KnowledgeScope::from_group_id(&scope.group_id()),
                Some(scope)
            );
        }
        assert_eq!(KnowledgeScope::from_group_id("galaxy:x"), None);
    }

    #[test]
    fn test_validation() {
        assert!(KnowledgeScope::platform().validate().is_ok());
        assert!(KnowledgeScope::cell("trading", "c1").validate().is_ok());

        let bad = KnowledgeScope {
            level: ScopeLevel::Realm,
            realm_id: None,
            formation_id: None,
            cell_id: None,
        };
        assert!(bad.validate().is_err());

        let bad = KnowledgeScope {
            level: ScopeLevel::Cell,
            realm_id: Some("trading".to_string()),
            formation_id: None,
            cell_id: None,
        };
        assert!(bad.validate().is_err());
    }
}
