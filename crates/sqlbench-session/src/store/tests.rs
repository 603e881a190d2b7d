//! Tests for the per-connection tab set

use super::*;
use crate::persist::PersistedTab;

fn titles(tabs: &ConnectionTabs) -> Vec<String> {
    tabs.tabs().iter().map(|t| t.title.clone()).collect()
}

/// Four consoles: Console, Console 2, Console 3, Console 4
fn four_tabs() -> (ConnectionTabs, Vec<Uuid>) {
    let mut tabs = ConnectionTabs::new("conn");
    let mut ids = vec![tabs.active_id()];
    for _ in 0..3 {
        ids.push(tabs.create(NewTab::console()));
    }
    (tabs, ids)
}

mod create_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_set_has_one_focused_console() {
        let tabs = ConnectionTabs::new("conn");
        assert_eq!(tabs.len(), 1);
        let active = tabs.active().expect("active tab");
        assert_eq!(active.title, "Console");
        assert_eq!(active.kind, TabKind::Console);
        assert_eq!(active.connection_id, "conn");
    }

    #[test]
    fn test_console_titles_are_numbered() {
        let (tabs, _) = four_tabs();
        assert_eq!(
            titles(&tabs),
            vec!["Console", "Console 2", "Console 3", "Console 4"]
        );
    }

    #[test]
    fn test_query_builder_titles_count_their_own_kind() {
        let mut tabs = ConnectionTabs::new("conn");
        tabs.create(NewTab::query_builder());
        tabs.create(NewTab::query_builder());
        assert_eq!(
            titles(&tabs),
            vec!["Console", "Visual Query", "Visual Query 2"]
        );
    }

    #[test]
    fn test_explicit_title_wins() {
        let mut tabs = ConnectionTabs::new("conn");
        let id = tabs.create(NewTab::console().with_title("Reports"));
        assert_eq!(tabs.get(id).map(|t| t.title.as_str()), Some("Reports"));
    }

    #[test]
    fn test_table_tab_is_titled_by_table_and_focused() {
        let mut tabs = ConnectionTabs::new("conn");
        let id = tabs.create(NewTab::table("orders").with_pk_column("id"));

        let tab = tabs.get(id).expect("tab");
        assert_eq!(tab.title, "orders");
        assert_eq!(tab.active_table.as_deref(), Some("orders"));
        assert_eq!(tab.pk_column.as_deref(), Some("id"));
        assert_eq!(tabs.active_id(), id);
    }

    #[test]
    fn test_duplicate_table_tab_focuses_existing() {
        let mut tabs = ConnectionTabs::new("conn");
        let first = tabs.create(NewTab::table("orders"));
        tabs.create(NewTab::console());

        let second = tabs.create(NewTab::table("orders"));

        assert_eq!(first, second);
        assert_eq!(tabs.len(), 3);
        assert_eq!(tabs.active_id(), first);
    }

    #[test]
    fn test_same_table_in_other_schema_is_a_new_tab() {
        let mut tabs = ConnectionTabs::new("conn");
        let sales = tabs.create(NewTab::table("orders").with_schema("sales"));
        let archive = tabs.create(NewTab::table("orders").with_schema("archive"));
        assert_ne!(sales, archive);

        // Without a schema any bound tab for the table matches
        let any = tabs.create(NewTab::table("orders"));
        assert_eq!(any, sales);
    }
}

mod close_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_closing_only_tab_creates_fresh_console() {
        let mut tabs = ConnectionTabs::new("conn");
        let only = tabs.active_id();

        assert!(tabs.close(only));

        assert_eq!(tabs.len(), 1);
        let fresh = tabs.active().expect("active");
        assert_ne!(fresh.id, only);
        assert_eq!(fresh.title, "Console");
    }

    #[test]
    fn test_closing_active_focuses_left_neighbour() {
        let (mut tabs, ids) = four_tabs();
        tabs.set_active(ids[2]);

        tabs.close(ids[2]);

        assert_eq!(tabs.active_id(), ids[1]);
        assert_eq!(tabs.len(), 3);
    }

    #[test]
    fn test_closing_first_active_focuses_new_first() {
        let (mut tabs, ids) = four_tabs();
        tabs.set_active(ids[0]);

        tabs.close(ids[0]);

        assert_eq!(tabs.active_id(), ids[1]);
    }

    #[test]
    fn test_closing_inactive_keeps_focus() {
        let (mut tabs, ids) = four_tabs();
        tabs.set_active(ids[3]);

        tabs.close(ids[1]);

        assert_eq!(tabs.active_id(), ids[3]);
    }

    #[test]
    fn test_closing_unknown_id_is_noop() {
        let (mut tabs, ids) = four_tabs();
        assert!(!tabs.close(Uuid::new_v4()));
        assert_eq!(tabs.len(), 4);
        assert_eq!(tabs.active_id(), ids[3]);
    }

    #[test]
    fn test_close_all_leaves_one_console() {
        let (mut tabs, ids) = four_tabs();
        tabs.close_all();
        assert_eq!(tabs.len(), 1);
        assert!(!ids.contains(&tabs.active_id()));
        assert_eq!(titles(&tabs), vec!["Console"]);
    }

    #[test]
    fn test_close_others_keeps_and_focuses_target() {
        let (mut tabs, ids) = four_tabs();
        assert!(tabs.close_others(ids[1]));
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs.active_id(), ids[1]);

        assert!(!tabs.close_others(Uuid::new_v4()));
        assert_eq!(tabs.len(), 1);
    }

    #[test]
    fn test_close_to_left_moves_focus_when_active_removed() {
        let (mut tabs, ids) = four_tabs();
        tabs.set_active(ids[0]);

        assert!(tabs.close_to_left(ids[2]));

        assert_eq!(titles(&tabs), vec!["Console 3", "Console 4"]);
        assert_eq!(tabs.active_id(), ids[2]);
    }

    #[test]
    fn test_close_to_left_keeps_focus_when_active_survives() {
        let (mut tabs, ids) = four_tabs();
        tabs.set_active(ids[3]);

        tabs.close_to_left(ids[2]);

        assert_eq!(tabs.active_id(), ids[3]);
    }

    #[test]
    fn test_close_to_right() {
        let (mut tabs, ids) = four_tabs();
        tabs.set_active(ids[3]);

        assert!(tabs.close_to_right(ids[1]));

        assert_eq!(titles(&tabs), vec!["Console", "Console 2"]);
        assert_eq!(tabs.active_id(), ids[1]);
    }

    #[test]
    fn test_close_to_side_of_unknown_id_is_noop() {
        let (mut tabs, ids) = four_tabs();
        assert!(!tabs.close_to_left(Uuid::new_v4()));
        assert!(!tabs.close_to_right(Uuid::new_v4()));
        assert_eq!(tabs.len(), 4);
        assert_eq!(tabs.active_id(), ids[3]);
    }
}

mod update_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_update_does_not_change_focus() {
        let (mut tabs, ids) = four_tabs();
        let patch = TabPatch {
            query: Some("SELECT 1".into()),
            ..TabPatch::default()
        };

        assert!(tabs.update(ids[0], patch.clone()));
        assert_eq!(tabs.active_id(), ids[3]);
        assert_eq!(tabs.get(ids[0]).map(|t| t.query.as_str()), Some("SELECT 1"));

        assert!(!tabs.update(Uuid::new_v4(), patch));
    }

    #[test]
    fn test_set_active_unknown_is_noop() {
        let (mut tabs, ids) = four_tabs();
        assert!(!tabs.set_active(Uuid::new_v4()));
        assert_eq!(tabs.active_id(), ids[3]);
    }

    #[test]
    fn test_reorder_keeps_focus() {
        let (mut tabs, ids) = four_tabs();
        tabs.set_active(ids[1]);

        assert!(tabs.reorder(ids[3], 0));
        assert_eq!(
            titles(&tabs),
            vec!["Console 4", "Console", "Console 2", "Console 3"]
        );
        assert_eq!(tabs.active_id(), ids[1]);

        assert!(tabs.reorder(ids[3], 99));
        assert_eq!(tabs.position(ids[3]), Some(3));
        assert!(!tabs.reorder(Uuid::new_v4(), 0));
    }
}

mod restore_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_keeps_order_and_focus() {
        let (mut tabs, ids) = four_tabs();
        tabs.set_active(ids[2]);

        let restored = ConnectionTabs::restore("conn", tabs.to_persisted());

        assert_eq!(titles(&restored), titles(&tabs));
        assert_eq!(restored.active_id(), ids[2]);
    }

    #[test]
    fn test_empty_session_restores_default_console() {
        let restored = ConnectionTabs::restore("conn", PersistedSession::new(vec![], None));
        assert_eq!(titles(&restored), vec!["Console"]);
    }

    #[test]
    fn test_stale_active_id_falls_back_to_first() {
        let tab = Tab::console("conn");
        let first = tab.id;
        let session = PersistedSession::new(vec![PersistedTab::from(&tab)], Some(Uuid::new_v4()));

        let restored = ConnectionTabs::restore("conn", session);
        assert_eq!(restored.active_id(), first);
    }

    #[test]
    fn test_restore_claims_tabs_for_connection() {
        let tab = Tab::console("elsewhere");
        let session = PersistedSession::new(vec![PersistedTab::from(&tab)], None);

        let restored = ConnectionTabs::restore("conn", session);
        assert_eq!(restored.tabs()[0].connection_id, "conn");
    }
}
