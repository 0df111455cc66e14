//! Override graph repository — the authority gate, acyclicity enforcement,
//! and the active-decision view.
//!
//! Edges point from the overriding decision to the overridden one. The whole
//! batch of edges is written in a single transaction: any failed check rolls
//! back every edge, so the graph is never left half-updated.

use std::collections::HashSet;

use chrono::Utc;

use mil_core::entities::Decision;
use mil_core::enums::DecisionStatus;

use crate::error::StoreError;
use crate::repos::decision::row_to_decision;
use crate::service::MilService;

/// Everything reachable from `start` along overriding -> overridden edges,
/// i.e. the set of decisions `start` transitively overrides.
async fn override_closure(
    conn: &libsql::Connection,
    start: i64,
) -> Result<HashSet<i64>, StoreError> {
    let mut seen = HashSet::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        let mut rows = conn
            .query(
                "SELECT overridden_id FROM decision_overrides WHERE overriding_id = ?1",
                [id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            let next: i64 = row.get(0)?;
            if seen.insert(next) {
                stack.push(next);
            }
        }
    }
    Ok(seen)
}

async fn level_of_decision(
    conn: &libsql::Connection,
    project_id: i64,
    decision_id: i64,
    column: &str,
) -> Result<Option<i64>, StoreError> {
    let mut rows = conn
        .query(
            &format!("SELECT {column} FROM decisions WHERE project_id = ?1 AND id = ?2"),
            libsql::params![project_id, decision_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row.get(0)?)),
        None => Ok(None),
    }
}

impl MilService {
    /// Record that one decision overrides one or more targets.
    ///
    /// Per target, in order: the target must exist, must not be the
    /// overriding decision itself, the overriding maker's snapshotted level
    /// must strictly exceed the target's required level, and the new edge
    /// must not close a cycle. All edges land in one transaction; the first
    /// failure rolls back the whole batch.
    ///
    /// # Errors
    ///
    /// `StoreError::Validation` for an empty batch or self-override,
    /// `StoreError::NotFound` naming every missing target,
    /// `StoreError::Authority` when the gate rejects,
    /// `StoreError::Cycle` when the edge would close a loop,
    /// `StoreError::Duplicate` when the edge already exists.
    pub async fn override_decisions(
        &self,
        project_id: i64,
        overriding_id: i64,
        target_ids: &[i64],
    ) -> Result<(), StoreError> {
        if target_ids.is_empty() {
            return Err(StoreError::Validation(
                "override requires at least one target decision".into(),
            ));
        }

        let tx = self.db().conn().transaction().await?;

        let maker_level = level_of_decision(&tx, project_id, overriding_id, "maker_level")
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("decision {overriding_id}")))?;

        // Resolve every target before touching the graph so a partial batch
        // never lands and the error names all missing ids at once.
        let mut required = Vec::with_capacity(target_ids.len());
        let mut missing = Vec::new();
        for &target_id in target_ids {
            match level_of_decision(&tx, project_id, target_id, "required_level").await? {
                Some(level) => required.push((target_id, level)),
                None => missing.push(target_id.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(StoreError::NotFound(format!(
                "decisions not found: {}",
                missing.join(", ")
            )));
        }

        let now = Utc::now();
        for (target_id, required_level) in required {
            if target_id == overriding_id {
                return Err(StoreError::Validation(format!(
                    "decision {overriding_id} cannot override itself"
                )));
            }
            if maker_level <= required_level {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                return Err(StoreError::Authority {
                    decision_id: target_id,
                    maker_level: maker_level as u8,
                    required_level: required_level as u8,
                });
            }
            // The closure sees edges inserted earlier in this batch, so a
            // cycle assembled across the batch is still caught.
            if override_closure(&tx, target_id).await?.contains(&overriding_id) {
                return Err(StoreError::Cycle {
                    overriding_id,
                    target_id,
                });
            }
            tx.execute(
                "INSERT INTO decision_overrides (overriding_id, overridden_id, created_at) \
                 VALUES (?1, ?2, ?3)",
                libsql::params![overriding_id, target_id, now.to_rfc3339()],
            )
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(
            overriding_id,
            targets = target_ids.len(),
            "recorded override edges"
        );
        Ok(())
    }

    /// Accepted decisions not directly overridden by any other accepted
    /// decision, oldest first.
    ///
    /// Only direct edges count: a decision overridden solely by proposed,
    /// rejected, or deprecated decisions is still active.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on query failure.
    pub async fn list_active_decisions(
        &self,
        project_id: i64,
    ) -> Result<Vec<Decision>, StoreError> {
        let sql = format!(
            "SELECT d.id, d.project_id, d.title, d.decision_text, d.context, d.alternatives, \
             d.consequences, d.tags, d.status, d.required_level, d.maker, d.maker_level, \
             d.created_at, d.updated_at \
             FROM decisions d \
             WHERE d.project_id = ?1 AND d.status = '{accepted}' \
             AND NOT EXISTS ( \
                 SELECT 1 FROM decision_overrides o \
                 JOIN decisions w ON w.id = o.overriding_id \
                 WHERE o.overridden_id = d.id AND w.status = '{accepted}') \
             ORDER BY d.created_at, d.id",
            accepted = DecisionStatus::Accepted.as_str()
        );
        let mut rows = self.db().conn().query(&sql, [project_id]).await?;

        let mut decisions = Vec::new();
        while let Some(row) = rows.next().await? {
            decisions.push(row_to_decision(&row)?);
        }
        Ok(decisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::decision::DecisionDraft;
    use crate::test_support::helpers::{test_project, test_service};
    use pretty_assertions::assert_eq;

    async fn decision(
        svc: &MilService,
        project_id: i64,
        title: &str,
        required_level: i64,
        maker: &str,
        status: &str,
    ) -> i64 {
        svc.create_decision(
            project_id,
            DecisionDraft {
                status: Some(status.into()),
                ..DecisionDraft::new(title, "text", required_level, maker)
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn higher_authority_can_override() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;
        let old = decision(&svc, project_id, "Old", 2, "bob", "accepted").await;
        let new = decision(&svc, project_id, "New", 2, "alice", "accepted").await;

        svc.override_decisions(project_id, new, &[old]).await.unwrap();

        let detail = svc.get_decision(project_id, new).await.unwrap();
        assert_eq!(detail.overrides.len(), 1);
        assert_eq!(detail.overrides[0].id, old);
        let old_detail = svc.get_decision(project_id, old).await.unwrap();
        assert_eq!(old_detail.overridden_by[0].id, new);
    }

    #[tokio::test]
    async fn equal_level_is_rejected() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;
        // bob holds level 2; the target requires exactly 2. Strict gate.
        let target = decision(&svc, project_id, "Target", 2, "alice", "accepted").await;
        let challenger = decision(&svc, project_id, "Challenger", 1, "bob", "accepted").await;

        let result = svc.override_decisions(project_id, challenger, &[target]).await;
        assert!(matches!(
            result,
            Err(StoreError::Authority {
                maker_level: 2,
                required_level: 2,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn lower_authority_is_rejected() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;
        let target = decision(&svc, project_id, "Target", 4, "alice", "accepted").await;
        let challenger = decision(&svc, project_id, "Challenger", 1, "dana", "accepted").await;

        let result = svc.override_decisions(project_id, challenger, &[target]).await;
        assert!(matches!(result, Err(StoreError::Authority { .. })));
    }

    #[tokio::test]
    async fn self_override_is_rejected() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;
        let id = decision(&svc, project_id, "Self", 1, "alice", "accepted").await;

        let result = svc.override_decisions(project_id, id, &[id]).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn cycle_is_rejected_and_graph_unchanged() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;
        let a = decision(&svc, project_id, "A", 1, "alice", "accepted").await;
        let b = decision(&svc, project_id, "B", 1, "alice", "accepted").await;
        let c = decision(&svc, project_id, "C", 1, "alice", "accepted").await;

        // a -> b -> c, then closing c <- a back-edge must fail.
        svc.override_decisions(project_id, a, &[b]).await.unwrap();
        svc.override_decisions(project_id, b, &[c]).await.unwrap();

        let result = svc.override_decisions(project_id, c, &[a]).await;
        assert!(matches!(
            result,
            Err(StoreError::Cycle {
                overriding_id,
                target_id,
            }) if overriding_id == c && target_id == a
        ));

        // Edge set unchanged: c still has no outgoing edges.
        let c_detail = svc.get_decision(project_id, c).await.unwrap();
        assert!(c_detail.overrides.is_empty());
    }

    #[tokio::test]
    async fn two_cycle_is_rejected() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;
        let a = decision(&svc, project_id, "A", 1, "alice", "accepted").await;
        let b = decision(&svc, project_id, "B", 1, "alice", "accepted").await;

        svc.override_decisions(project_id, a, &[b]).await.unwrap();
        let result = svc.override_decisions(project_id, b, &[a]).await;
        assert!(matches!(result, Err(StoreError::Cycle { .. })));
    }

    #[tokio::test]
    async fn missing_targets_named_and_nothing_inserted() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;
        let overriding = decision(&svc, project_id, "New", 1, "alice", "accepted").await;
        let valid = decision(&svc, project_id, "Valid", 1, "alice", "accepted").await;

        let result = svc
            .override_decisions(project_id, overriding, &[valid, 777, 888])
            .await;
        match result {
            Err(StoreError::NotFound(msg)) => {
                assert!(msg.contains("777"), "{msg}");
                assert!(msg.contains("888"), "{msg}");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }

        // The valid target gained no edge.
        let detail = svc.get_decision(project_id, overriding).await.unwrap();
        assert!(detail.overrides.is_empty());
    }

    #[tokio::test]
    async fn failed_authority_rolls_back_whole_batch() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;
        let overriding = decision(&svc, project_id, "New", 1, "bob", "accepted").await;
        let easy = decision(&svc, project_id, "Easy", 1, "alice", "accepted").await;
        let hard = decision(&svc, project_id, "Hard", 4, "alice", "accepted").await;

        let result = svc
            .override_decisions(project_id, overriding, &[easy, hard])
            .await;
        assert!(matches!(result, Err(StoreError::Authority { .. })));

        let detail = svc.get_decision(project_id, overriding).await.unwrap();
        assert!(detail.overrides.is_empty(), "batch must be atomic");
    }

    #[tokio::test]
    async fn duplicate_edge_is_duplicate_error() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;
        let old = decision(&svc, project_id, "Old", 1, "alice", "accepted").await;
        let new = decision(&svc, project_id, "New", 1, "alice", "accepted").await;

        svc.override_decisions(project_id, new, &[old]).await.unwrap();
        let result = svc.override_decisions(project_id, new, &[old]).await;
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn empty_batch_is_validation_error() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;
        let id = decision(&svc, project_id, "Lonely", 1, "alice", "accepted").await;
        let result = svc.override_decisions(project_id, id, &[]).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn active_view_tracks_accepted_overrides() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;
        let a = decision(&svc, project_id, "A", 1, "alice", "accepted").await;
        let b = decision(&svc, project_id, "B", 1, "alice", "accepted").await;
        svc.override_decisions(project_id, b, &[a]).await.unwrap();

        let active = svc.list_active_decisions(project_id).await.unwrap();
        let ids: Vec<i64> = active.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![b]);

        // A proposed override does not unseat the accepted decision.
        let c = decision(&svc, project_id, "C", 1, "alice", "proposed").await;
        svc.override_decisions(project_id, c, &[b]).await.unwrap();
        let active = svc.list_active_decisions(project_id).await.unwrap();
        let ids: Vec<i64> = active.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![b]);

        // Accepting the challenger flips the view.
        svc.update_decision_status(project_id, c, DecisionStatus::Accepted)
            .await
            .unwrap();
        let active = svc.list_active_decisions(project_id).await.unwrap();
        let ids: Vec<i64> = active.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![c]);
    }

    #[tokio::test]
    async fn deprecating_the_overrider_reactivates_the_target() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;
        let d = decision(&svc, project_id, "D", 1, "alice", "accepted").await;
        let e = decision(&svc, project_id, "E", 1, "alice", "accepted").await;
        svc.override_decisions(project_id, e, &[d]).await.unwrap();

        svc.update_decision_status(project_id, e, DecisionStatus::Deprecated)
            .await
            .unwrap();
        let active = svc.list_active_decisions(project_id).await.unwrap();
        let ids: Vec<i64> = active.iter().map(|dec| dec.id).collect();
        // Direct-edge semantics: with E no longer accepted, D is active again.
        assert_eq!(ids, vec![d]);
    }

    #[tokio::test]
    async fn non_accepted_decisions_never_appear_active() {
        let svc = test_service().await;
        let project_id = test_project(&svc).await;
        decision(&svc, project_id, "Proposed", 1, "alice", "proposed").await;
        decision(&svc, project_id, "Rejected", 1, "alice", "rejected").await;
        let accepted = decision(&svc, project_id, "Accepted", 1, "alice", "accepted").await;

        let active = svc.list_active_decisions(project_id).await.unwrap();
        let ids: Vec<i64> = active.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![accepted]);
    }
}
