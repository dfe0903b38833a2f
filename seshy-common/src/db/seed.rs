//! Canonical system vibe seeding
//!
//! Reconciles the in-code canonical vibe list against the `vibes` table at
//! service boot: missing rows are inserted, drifted rows are overwritten with
//! canonical values (including undelete), and system rows that fell out of
//! the canonical list are deactivated in place. Non-system rows are never
//! touched unless their slug collides with a canonical entry, in which case
//! the row is claimed for the system set (logged at warn level - see
//! DESIGN.md).
//!
//! The routine is idempotent and safe to run on every boot. All writes apply
//! inside one transaction; concurrent boots racing on an insert are resolved
//! by the unique slug index (`INSERT OR IGNORE`).

use crate::domain::VibeCategory;
use crate::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::BTreeMap;
use tracing::{info, warn};
use uuid::Uuid;

/// A canonical vibe shipped with the product. Immutable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VibeDefinition {
    pub slug: &'static str,
    pub name: &'static str,
    pub category: VibeCategory,
    pub is_active: bool,
}

const fn vibe(
    slug: &'static str,
    name: &'static str,
    category: VibeCategory,
) -> VibeDefinition {
    VibeDefinition {
        slug,
        name,
        category,
        is_active: true,
    }
}

/// Canonical list of system-defined vibes.
///
/// Kept sorted alphabetically by slug for easier review. Slugs are stable
/// identifiers and must never change meaning once published; duplicates are
/// a programming error (not checked at runtime).
pub const DEFAULT_VIBES: &[VibeDefinition] = &[
    vibe("after-hours-groove", "After Hours Groove", VibeCategory::Energy),
    vibe("campus-cohort", "Campus Cohort", VibeCategory::ClassStanding),
    vibe("chill-hang", "Chill Hang", VibeCategory::Energy),
    vibe("cinema-club", "Cinema Club", VibeCategory::Cultural),
    vibe("community-potluck", "Community Potluck", VibeCategory::Hobbies),
    vibe("creative-lab", "Creative Lab", VibeCategory::Hobbies),
    vibe("deep-house-sessions", "Deep House Sessions", VibeCategory::Music),
    vibe("design-review", "Design Review", VibeCategory::Degree),
    vibe("game-night", "Game Night", VibeCategory::Cultural),
    vibe("grad-research-circle", "Grad Research Circle", VibeCategory::Degree),
    vibe("house-party", "House Party", VibeCategory::Locale),
    vibe("industry-mixer", "Industry Mixer", VibeCategory::Locale),
    vibe("live-acoustic", "Live Acoustic", VibeCategory::Music),
    vibe("open-decks", "Open Decks", VibeCategory::Music),
    vibe("rooftop-sunset", "Rooftop Sunset", VibeCategory::Locale),
    vibe("sound-bath", "Sound Bath", VibeCategory::Hobbies),
    vibe("startup-demo-day", "Startup Demo Day", VibeCategory::Degree),
    vibe("study-sprint", "Study Sprint", VibeCategory::ClassStanding),
    vibe("wellness-flow", "Wellness Flow", VibeCategory::Hobbies),
];

/// Counts returned by one reconciliation run. All-zero on a clean re-run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VibeSeedSummary {
    pub inserted: u64,
    pub updated: u64,
    pub inactivated: u64,
}

impl std::fmt::Display for VibeSeedSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Seeded system vibes (inserted={}, updated={}, inactivated={})",
            self.inserted, self.updated, self.inactivated
        )
    }
}

/// Persisted vibe fields the reconciler cares about
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VibeSeedRow {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub category: VibeCategory,
    pub system_defined: bool,
    pub is_active: bool,
    pub deleted_at: Option<NaiveDateTime>,
}

/// One pending field overwrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VibeUpdate {
    pub id: String,
    pub definition: VibeDefinition,
    /// Row had a non-null `deleted_at` that will be cleared
    pub undelete: bool,
    /// Row was not system-defined and will be claimed for the system set
    pub claim: bool,
}

/// Write set computed by [`plan_vibe_reconciliation`]. Applying an empty plan
/// is a no-op, which is what makes the routine idempotent.
#[derive(Debug, Clone, Default)]
pub struct VibeReconcilePlan {
    pub inserts: Vec<VibeDefinition>,
    pub updates: Vec<VibeUpdate>,
    /// Row ids of active system vibes absent from the canonical list
    pub deactivations: Vec<String>,
}

impl VibeReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deactivations.is_empty()
    }
}

/// Diff the canonical list against persisted rows keyed by slug.
///
/// Pure and deterministic: pass 1 walks `canonical` in order, pass 2 walks
/// the (ordered) persisted map. `persisted` must contain every row flagged
/// system-defined plus any row whose slug collides with a canonical entry,
/// regardless of active/deleted state.
pub fn plan_vibe_reconciliation(
    canonical: &[VibeDefinition],
    persisted: &BTreeMap<String, VibeSeedRow>,
) -> VibeReconcilePlan {
    let mut plan = VibeReconcilePlan::default();

    for def in canonical {
        let Some(row) = persisted.get(def.slug) else {
            plan.inserts.push(*def);
            continue;
        };

        let fields_drifted =
            row.name != def.name || row.category != def.category || row.is_active != def.is_active;
        let undelete = row.deleted_at.is_some();
        let claim = !row.system_defined;

        if fields_drifted || undelete || claim {
            plan.updates.push(VibeUpdate {
                id: row.id.clone(),
                definition: *def,
                undelete,
                claim,
            });
        }
    }

    for (slug, row) in persisted {
        if canonical.iter().any(|def| def.slug == slug.as_str()) {
            continue;
        }
        // Only system rows are retired; a colliding user row absent from the
        // canonical list was never loaded as such, but guard anyway.
        if row.system_defined && row.is_active {
            plan.deactivations.push(row.id.clone());
        }
    }

    plan
}

/// Ensure every canonical vibe exists as a system-defined row.
///
/// Opens its own transaction and commits on success. Errors from the
/// persistence layer propagate unmodified and roll the transaction back.
pub async fn upsert_default_vibes(pool: &SqlitePool) -> Result<VibeSeedSummary> {
    let mut tx = pool.begin().await?;
    let summary = upsert_default_vibes_in(&mut *tx).await?;
    tx.commit().await?;
    Ok(summary)
}

/// Transaction-agnostic variant of [`upsert_default_vibes`].
///
/// Does not commit; the caller owns the transaction boundary and may batch
/// the seeding with other startup work.
pub async fn upsert_default_vibes_in(conn: &mut SqliteConnection) -> Result<VibeSeedSummary> {
    let persisted = load_candidate_rows(conn, DEFAULT_VIBES).await?;
    let plan = plan_vibe_reconciliation(DEFAULT_VIBES, &persisted);
    apply_plan(conn, &plan).await
}

/// Load every system-defined row plus any row colliding with a canonical
/// slug, keyed by slug. Deleted and inactive rows are included on purpose:
/// reconciliation undeletes and reactivates.
async fn load_candidate_rows(
    conn: &mut SqliteConnection,
    canonical: &[VibeDefinition],
) -> Result<BTreeMap<String, VibeSeedRow>> {
    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT id, slug, name, category, system_defined, is_active, deleted_at \
         FROM vibes WHERE system_defined = 1 OR slug IN (",
    );
    let mut slugs = query.separated(", ");
    for def in canonical {
        slugs.push_bind(def.slug);
    }
    query.push(")");

    let rows: Vec<VibeSeedRow> = query.build_query_as().fetch_all(&mut *conn).await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.slug.clone(), row))
        .collect())
}

async fn apply_plan(
    conn: &mut SqliteConnection,
    plan: &VibeReconcilePlan,
) -> Result<VibeSeedSummary> {
    let mut summary = VibeSeedSummary::default();

    for def in &plan.inserts {
        // OR IGNORE: a concurrent boot may have won the insert race on the
        // unique slug index. Losing is benign; the row already matches.
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO vibes (id, name, slug, category, system_defined, is_active)
            VALUES (?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(def.name)
        .bind(def.slug)
        .bind(def.category)
        .bind(def.is_active)
        .execute(&mut *conn)
        .await?;

        summary.inserted += result.rows_affected();
    }

    for update in &plan.updates {
        if update.claim {
            warn!(
                slug = update.definition.slug,
                "claiming non-system vibe row for the canonical set"
            );
        }

        sqlx::query(
            r#"
            UPDATE vibes
            SET name = ?, category = ?, is_active = ?, system_defined = 1,
                deleted_at = NULL, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(update.definition.name)
        .bind(update.definition.category)
        .bind(update.definition.is_active)
        .bind(&update.id)
        .execute(&mut *conn)
        .await?;

        summary.updated += 1;
    }

    for id in &plan.deactivations {
        sqlx::query(
            "UPDATE vibes SET is_active = 0, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;

        summary.inactivated += 1;
    }

    if summary != VibeSeedSummary::default() {
        info!(
            inserted = summary.inserted,
            updated = summary.updated,
            inactivated = summary.inactivated,
            "system vibe catalog reconciled"
        );
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(slug: &str, name: &str, category: VibeCategory) -> VibeSeedRow {
        VibeSeedRow {
            id: Uuid::new_v4().to_string(),
            slug: slug.to_string(),
            name: name.to_string(),
            category,
            system_defined: true,
            is_active: true,
            deleted_at: None,
        }
    }

    fn as_map(rows: Vec<VibeSeedRow>) -> BTreeMap<String, VibeSeedRow> {
        rows.into_iter().map(|r| (r.slug.clone(), r)).collect()
    }

    #[test]
    fn default_vibes_have_unique_sorted_slugs() {
        let slugs: Vec<&str> = DEFAULT_VIBES.iter().map(|d| d.slug).collect();
        let mut sorted = slugs.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(slugs, sorted, "slugs must be unique and sorted");
    }

    #[test]
    fn no_default_vibe_uses_the_custom_category() {
        assert!(DEFAULT_VIBES
            .iter()
            .all(|d| d.category != VibeCategory::Custom));
    }

    #[test]
    fn empty_state_plans_all_inserts() {
        let plan = plan_vibe_reconciliation(DEFAULT_VIBES, &BTreeMap::new());
        assert_eq!(plan.inserts.len(), DEFAULT_VIBES.len());
        assert!(plan.updates.is_empty());
        assert!(plan.deactivations.is_empty());
    }

    #[test]
    fn matching_state_plans_nothing() {
        let rows = DEFAULT_VIBES
            .iter()
            .map(|d| row(d.slug, d.name, d.category))
            .collect();
        let plan = plan_vibe_reconciliation(DEFAULT_VIBES, &as_map(rows));
        assert!(plan.is_empty());
    }

    #[test]
    fn stale_name_plans_an_update() {
        let canonical = &[vibe("house-party", "House Party", VibeCategory::Locale)];
        let rows = as_map(vec![row("house-party", "Houseparty", VibeCategory::Locale)]);

        let plan = plan_vibe_reconciliation(canonical, &rows);
        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].definition.name, "House Party");
        assert!(!plan.updates[0].undelete);
        assert!(!plan.updates[0].claim);
    }

    #[test]
    fn deleted_row_plans_an_undelete() {
        let canonical = &[vibe("x", "X", VibeCategory::Energy)];
        let mut deleted = row("x", "X", VibeCategory::Energy);
        deleted.deleted_at = NaiveDateTime::parse_from_str("2024-11-19 00:00:00", "%Y-%m-%d %H:%M:%S").ok();
        deleted.is_active = true;

        let plan = plan_vibe_reconciliation(canonical, &as_map(vec![deleted]));
        assert_eq!(plan.updates.len(), 1);
        assert!(plan.updates[0].undelete);
    }

    #[test]
    fn retired_system_slug_plans_a_deactivation() {
        let canonical = &[vibe("keeper", "Keeper", VibeCategory::Energy)];
        let rows = as_map(vec![
            row("keeper", "Keeper", VibeCategory::Energy),
            row("retired-tag", "Retired", VibeCategory::Music),
        ]);

        let plan = plan_vibe_reconciliation(canonical, &rows);
        assert!(plan.inserts.is_empty());
        assert!(plan.updates.is_empty());
        assert_eq!(plan.deactivations.len(), 1);
    }

    #[test]
    fn inactive_retired_slug_is_not_deactivated_again() {
        let canonical: &[VibeDefinition] = &[];
        let mut retired = row("retired-tag", "Retired", VibeCategory::Music);
        retired.is_active = false;

        let plan = plan_vibe_reconciliation(canonical, &as_map(vec![retired]));
        assert!(plan.is_empty());
    }

    #[test]
    fn colliding_user_row_plans_a_claim() {
        let canonical = &[vibe("house-party", "House Party", VibeCategory::Locale)];
        let mut user_row = row("house-party", "House Party", VibeCategory::Locale);
        user_row.system_defined = false;

        let plan = plan_vibe_reconciliation(canonical, &as_map(vec![user_row]));
        assert_eq!(plan.updates.len(), 1);
        assert!(plan.updates[0].claim);
    }
}
