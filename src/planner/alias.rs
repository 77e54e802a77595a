//! Table alias assignment.
//!
//! The base alias of an entity is the initials of its schema words followed
//! by the initials of its table words (`sales.order_items` -> `soi`), unless
//! the entity declares an `alias_prefix`. Collisions get an integer suffix
//! starting at 2 (`so`, `so2`, `so3`). Aliases that spell a SQL keyword
//! (`finance.order_refunds` -> `for`) are suffixed the same way, since they
//! are emitted unquoted. A manager lives for one compilation.

use std::collections::{BTreeMap, HashSet};

use crate::catalog::Entity;
use crate::sql::expr::is_keyword;

/// Assigns collision-free aliases to entities.
#[derive(Debug, Clone, Default)]
pub struct AliasManager {
    by_entity: BTreeMap<String, String>,
    used: HashSet<String>,
}

impl AliasManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias for `entity`, assigning a fresh one on first use.
    pub fn assign(&mut self, entity: &Entity) -> String {
        if let Some(alias) = self.by_entity.get(&entity.name) {
            return alias.clone();
        }

        let base = base_alias(entity);
        let mut candidate = base.clone();
        let mut suffix = 2;
        while self.used.contains(&candidate) || is_keyword(&candidate) {
            candidate = format!("{}{}", base, suffix);
            suffix += 1;
        }

        self.used.insert(candidate.clone());
        self.by_entity
            .insert(entity.name.clone(), candidate.clone());
        candidate
    }

    pub fn get(&self, entity: &str) -> Option<&str> {
        self.by_entity.get(entity).map(String::as_str)
    }

    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.by_entity
    }

    pub fn into_aliases(self) -> BTreeMap<String, String> {
        self.by_entity
    }
}

/// Alias before collision handling.
pub fn base_alias(entity: &Entity) -> String {
    let raw = match &entity.alias_prefix {
        Some(prefix) => prefix.to_lowercase(),
        None => format!("{}{}", initials(&entity.schema), initials(&entity.table)),
    };

    let mut alias: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if alias.is_empty() {
        alias.push('t');
    } else if alias.starts_with(|c: char| c.is_ascii_digit()) {
        alias.insert(0, 't');
    }
    alias
}

fn initials(name: &str) -> String {
    name.split(['_', ' ', '-'])
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_lowercase)
        .collect()
}
