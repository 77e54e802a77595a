//! Join path resolution and JOIN clause rendering.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use super::alias::AliasManager;
use super::{JoinPathError, JoinResult};
use crate::catalog::{Direction, Entity, JoinPath, JoinStep, Relationship, SemanticCatalog};
use crate::sql::expr::ColumnRef;

/// One rendered JOIN and where it sits in the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinClause {
    pub sql: String,
    pub relationship: String,
    /// Entity already present in the query.
    pub from_entity: String,
    /// Entity this join brings in.
    pub to_entity: String,
    pub from_schema: String,
    pub to_schema: String,
    /// Whether the relationship was walked against its declared direction.
    pub reversed: bool,
}

impl JoinClause {
    /// Whether the two sides of the join live in different schemas.
    pub fn crosses_schema(&self) -> bool {
        self.from_schema != self.to_schema
    }
}

/// Output of [`JoinResolver::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedJoins {
    /// Joins in the order they must appear after FROM.
    pub joins: Vec<JoinClause>,
    /// entity -> alias, for the start entity and every joined entity.
    pub aliases: BTreeMap<String, String>,
    /// Entities in the order they enter the query, start entity first.
    pub join_order: Vec<String>,
}

impl ResolvedJoins {
    pub fn alias(&self, entity: &str) -> Option<&str> {
        self.aliases.get(entity).map(String::as_str)
    }

    pub fn schema_crossings(&self) -> usize {
        self.joins.iter().filter(|j| j.crosses_schema()).count()
    }
}

/// Connects a start entity to a set of target entities.
///
/// Reached entities are expanded in the order they entered the query. For
/// each still-missing target (in name order) the shortest relationship path
/// from any reached entity is taken, preferring the earliest reached entity on
/// ties. Only the hops that bring in new entities become joins, so entities
/// shared between paths are joined once.
pub struct JoinResolver<'a> {
    catalog: &'a SemanticCatalog,
}

impl<'a> JoinResolver<'a> {
    pub fn new(catalog: &'a SemanticCatalog) -> Self {
        Self { catalog }
    }

    pub fn resolve<'t, I>(&self, start: &str, targets: I) -> JoinResult<ResolvedJoins>
    where
        I: IntoIterator<Item = &'t str>,
    {
        let start_entity = self.entity(start)?;

        let mut pending = BTreeSet::new();
        for target in targets {
            self.entity(target)?;
            if target != start {
                pending.insert(target.to_string());
            }
        }

        let mut aliases = AliasManager::new();
        aliases.assign(start_entity);

        let mut state = Expansion {
            reached: BTreeSet::from([start.to_string()]),
            join_order: vec![start.to_string()],
            joins: Vec::new(),
        };

        for target in &pending {
            if state.reached.contains(target) {
                continue;
            }
            let Some(path) = self.best_path(&state.join_order, target) else {
                continue;
            };
            for step in &path.steps {
                if state.reached.contains(&step.to_entity) {
                    continue;
                }
                let entity = self.entity(&step.to_entity)?;
                aliases.assign(entity);
                let clause = self.render_join(step, &aliases)?;
                debug!(join = %clause.sql, "resolved join");
                state.reached.insert(step.to_entity.clone());
                state.join_order.push(step.to_entity.clone());
                state.joins.push(clause);
            }
        }

        let missing: Vec<String> = pending
            .into_iter()
            .filter(|t| !state.reached.contains(t))
            .collect();
        if !missing.is_empty() {
            return Err(JoinPathError::Unreachable {
                start: start.to_string(),
                missing,
            });
        }

        Ok(ResolvedJoins {
            joins: state.joins,
            aliases: aliases.into_aliases(),
            join_order: state.join_order,
        })
    }

    fn entity(&self, name: &str) -> JoinResult<&'a Entity> {
        self.catalog
            .entity(name)
            .map_err(|_| JoinPathError::UnknownEntity(name.to_string()))
    }

    /// Shortest path to `target` from any reached entity.
    fn best_path(&self, reached_in_order: &[String], target: &str) -> Option<JoinPath> {
        let graph = self.catalog.graph();
        let mut best: Option<JoinPath> = None;
        for source in reached_in_order {
            if let Some(path) = graph.find_path(source, target) {
                if best.as_ref().map_or(true, |b| path.len() < b.len()) {
                    best = Some(path);
                }
            }
        }
        best
    }

    fn render_join(&self, step: &JoinStep, aliases: &AliasManager) -> JoinResult<JoinClause> {
        let relationship = self
            .catalog
            .relationship(&step.owner, &step.relationship)
            .map_err(|_| JoinPathError::UnknownRelationship(step.relationship.clone()))?;
        let left = self.entity(&relationship.from_entity)?;
        let right = self.entity(&relationship.to_entity)?;
        let joined = self.entity(&step.to_entity)?;
        let existing = self.entity(&step.from_entity)?;

        let alias_of = |entity: &Entity| {
            aliases
                .get(&entity.name)
                .map(str::to_string)
                .ok_or_else(|| JoinPathError::UnknownEntity(entity.name.clone()))
        };
        let left_alias = alias_of(left)?;
        let right_alias = alias_of(right)?;
        let joined_alias = alias_of(joined)?;

        let conditions = relationship
            .join_conditions
            .iter()
            .map(|cond| -> JoinResult<String> {
                let l = condition_column(relationship, &cond.left, left)?;
                let r = condition_column(relationship, &cond.right, right)?;
                Ok(format!(
                    "{} = {}",
                    left.qualified_column(&left_alias, &l),
                    right.qualified_column(&right_alias, &r)
                ))
            })
            .collect::<JoinResult<Vec<String>>>()?;

        let sql = format!(
            "{} {} {} ON {}",
            relationship.join_type().as_sql(),
            joined.qualified_table(),
            joined_alias,
            conditions.join(" AND ")
        );

        Ok(JoinClause {
            sql,
            relationship: relationship.name.clone(),
            from_entity: existing.name.clone(),
            to_entity: joined.name.clone(),
            from_schema: existing.schema.clone(),
            to_schema: joined.schema.clone(),
            reversed: step.direction == Direction::Reverse,
        })
    }
}

struct Expansion {
    reached: BTreeSet<String>,
    join_order: Vec<String>,
    joins: Vec<JoinClause>,
}

/// Column name of one side of a join condition. A qualified reference must
/// name the side's own table.
fn condition_column(
    relationship: &Relationship,
    reference: &str,
    side: &Entity,
) -> JoinResult<String> {
    let invalid = || JoinPathError::InvalidJoinCondition {
        relationship: relationship.name.clone(),
        reference: reference.to_string(),
        entity: side.name.clone(),
    };
    let column = ColumnRef::parse(reference).ok_or_else(invalid)?;
    match &column.table {
        Some(table) if !side.matches_table(column.schema.as_deref(), table) => Err(invalid()),
        _ => Ok(column.column),
    }
}
