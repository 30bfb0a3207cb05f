//! Event journal
//!
//! Append-only per-order note stream. Externally visible events are
//! serialized as structured JSON blobs so the marketplace poller can
//! decode them; internal audit notes are plain text and never leave the
//! system. `replay` is the basis of the events endpoint.

use crate::db::repository::{OrderRepository, RepoResult};
use chrono::{DateTime, Utc};
use shared::order::EventEntry;
use sqlx::SqliteConnection;

/// Record a batch of event entries on an order.
///
/// Entries with no content at all are dropped. With
/// `externally_visible = true` the batch is written as one structured
/// record the poller can parse; otherwise it lands as readable plain
/// text for the merchant only.
pub async fn record(
    conn: &mut SqliteConnection,
    order_id: i64,
    entries: &[EventEntry],
    externally_visible: bool,
) -> RepoResult<()> {
    let retained: Vec<&EventEntry> = entries.iter().filter(|e| !e.is_empty()).collect();
    if retained.is_empty() {
        return Ok(());
    }

    if externally_visible {
        let content = serde_json::to_string(&retained)?;
        OrderRepository::add_note(conn, order_id, &content, true).await?;
    } else {
        let lines: Vec<String> = retained.iter().map(|e| format_entry(e)).collect();
        OrderRepository::add_note(conn, order_id, &lines.join("\n"), false).await?;
    }
    Ok(())
}

/// Record a free-form internal audit note
pub async fn note(conn: &mut SqliteConnection, order_id: i64, text: &str) -> RepoResult<()> {
    OrderRepository::add_note(conn, order_id, text, false).await?;
    Ok(())
}

/// Decode the order's structured journal records in insertion order.
///
/// Each replayed entry is stamped with its record's timestamp normalized
/// to UTC ISO-8601. Plain (internal) records are skipped.
pub async fn replay(conn: &mut SqliteConnection, order_id: i64) -> RepoResult<Vec<EventEntry>> {
    let rows = OrderRepository::notes(conn, order_id).await?;

    let mut events = Vec::new();
    for row in rows {
        if !row.is_structured {
            continue;
        }
        // decode guard: a corrupt record must not break the poller
        let Ok(entries) = serde_json::from_str::<Vec<EventEntry>>(&row.content) else {
            continue;
        };
        let time = normalize_utc(&row.created_at);
        for mut entry in entries {
            entry.time = Some(time.clone());
            events.push(entry);
        }
    }
    Ok(events)
}

/// True when the order has at least one journal record of any kind
pub async fn has_records(conn: &mut SqliteConnection, order_id: i64) -> RepoResult<bool> {
    Ok(!OrderRepository::notes(conn, order_id).await?.is_empty())
}

fn normalize_utc(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc).to_rfc3339())
        .unwrap_or_else(|_| raw.to_string())
}

fn format_entry(entry: &EventEntry) -> String {
    let mut parts = vec![format!("action: {}", entry.action)];
    if !entry.affected_items.is_empty() {
        parts.push(format!("items: {}", entry.affected_items.join(", ")));
    }
    if !entry.tracking_number.is_empty() {
        parts.push(format!("tracking: {}", entry.tracking_number));
    }
    if !entry.carrier.is_empty() {
        parts.push(format!("carrier: {}", entry.carrier));
    }
    if !entry.notes.is_empty() {
        parts.push(format!("notes: {}", entry.notes));
    }
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::order::NewOrder;
    use crate::db::test_support;

    async fn order(conn: &mut SqliteConnection) -> i64 {
        OrderRepository::insert_order(conn, &NewOrder::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_record_replay_round_trip() {
        let pool = test_support::pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let order_id = order(&mut conn).await;

        let entry = EventEntry {
            action: "shipped".to_string(),
            affected_items: vec!["i-1".to_string(), "i-2".to_string()],
            tracking_number: "LV42".to_string(),
            carrier: "DPD".to_string(),
            ..Default::default()
        };
        record(&mut conn, order_id, std::slice::from_ref(&entry), true)
            .await
            .unwrap();

        let events = replay(&mut conn, order_id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, entry.action);
        assert_eq!(events[0].affected_items, entry.affected_items);
        assert_eq!(events[0].tracking_number, entry.tracking_number);

        // time is stamped and UTC-normalized
        let time = events[0].time.as_ref().unwrap();
        let parsed = DateTime::parse_from_rfc3339(time).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
    }

    #[tokio::test]
    async fn test_internal_records_never_replay() {
        let pool = test_support::pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let order_id = order(&mut conn).await;

        record(
            &mut conn,
            order_id,
            &[EventEntry::action("created", vec!["i-1".to_string()])],
            false,
        )
        .await
        .unwrap();
        note(&mut conn, order_id, "Marketplace updated order. Updated fields: Sample")
            .await
            .unwrap();

        assert!(replay(&mut conn, order_id).await.unwrap().is_empty());
        assert!(has_records(&mut conn, order_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_replay_preserves_insertion_order() {
        let pool = test_support::pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let order_id = order(&mut conn).await;

        for action in ["created", "picked", "shipped"] {
            record(
                &mut conn,
                order_id,
                &[EventEntry::action(action, vec!["i-1".to_string()])],
                true,
            )
            .await
            .unwrap();
        }

        let actions: Vec<String> = replay(&mut conn, order_id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(actions, vec!["created", "picked", "shipped"]);
    }

    #[tokio::test]
    async fn test_empty_entries_are_not_journaled() {
        let pool = test_support::pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let order_id = order(&mut conn).await;

        record(&mut conn, order_id, &[EventEntry::default()], true)
            .await
            .unwrap();
        assert!(!has_records(&mut conn, order_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_structured_record_is_skipped() {
        let pool = test_support::pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let order_id = order(&mut conn).await;

        OrderRepository::add_note(&mut conn, order_id, "not-json{", true)
            .await
            .unwrap();
        record(
            &mut conn,
            order_id,
            &[EventEntry::action("canceled", vec!["i-1".to_string()])],
            true,
        )
        .await
        .unwrap();

        let events = replay(&mut conn, order_id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, "canceled");
    }
}
