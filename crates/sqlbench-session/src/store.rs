//! Per-connection tab set with a single focus pointer
//!
//! Every operation keeps two invariants: a connection always has at least
//! one tab, and exactly one of them is active. Operations addressed at an
//! unknown tab id change nothing and return `false`.

use uuid::Uuid;

use crate::persist::PersistedSession;
use crate::tab::{NewTab, Tab, TabKind, TabPatch};

#[derive(Debug, Clone)]
pub struct ConnectionTabs {
    connection_id: String,
    tabs: Vec<Tab>,
    active: Uuid,
}

impl ConnectionTabs {
    /// A fresh set holding one default console tab
    pub fn new(connection_id: impl Into<String>) -> Self {
        let connection_id = connection_id.into();
        let tab = Tab::console(connection_id.clone());
        Self {
            active: tab.id,
            tabs: vec![tab],
            connection_id,
        }
    }

    /// Rebuild a tab set from storage.
    ///
    /// Transient fields start empty. An empty session yields a default console
    /// tab; a stale active id falls back to the first tab.
    pub fn restore(connection_id: impl Into<String>, session: PersistedSession) -> Self {
        let connection_id = connection_id.into();
        let tabs: Vec<Tab> = session
            .tabs
            .into_iter()
            .map(|persisted| {
                let mut tab = Tab::from(persisted);
                tab.connection_id = connection_id.clone();
                tab
            })
            .collect();

        let Some(first) = tabs.first() else {
            return Self::new(connection_id);
        };
        let active = session
            .active_tab_id
            .filter(|id| tabs.iter().any(|t| t.id == *id))
            .unwrap_or(first.id);

        Self {
            connection_id,
            tabs,
            active,
        }
    }

    /// Durable snapshot of every tab plus the focus pointer
    pub fn to_persisted(&self) -> PersistedSession {
        PersistedSession::new(self.tabs.iter().map(Into::into).collect(), Some(self.active))
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active_id(&self) -> Uuid {
        self.active
    }

    pub fn active(&self) -> Option<&Tab> {
        self.get(self.active)
    }

    pub fn get(&self, id: Uuid) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    /// Open a tab and focus it.
    ///
    /// A table tab for a table that already has one focuses the existing tab
    /// instead. Returns the id of the focused tab.
    pub fn create(&mut self, request: NewTab) -> Uuid {
        if request.kind == TabKind::Table
            && let Some(table) = request.table.as_deref()
            && let Some(existing) = self
                .tabs
                .iter()
                .find(|t| t.is_bound_to(table, request.schema.as_deref()))
        {
            tracing::debug!(tab_id = %existing.id, table = %table, "focusing existing table tab");
            self.active = existing.id;
            return existing.id;
        }

        let title = request
            .title
            .clone()
            .unwrap_or_else(|| self.default_title(&request));
        let mut tab = Tab::new(self.connection_id.clone(), request.kind, title);
        tab.query = request.query.unwrap_or_default();
        tab.active_table = request.table;
        tab.schema = request.schema;
        tab.pk_column = request.pk_column;
        tab.flow_state = request.flow_state;

        let id = tab.id;
        tracing::debug!(tab_id = %id, kind = ?tab.kind, title = %tab.title, "created tab");
        self.tabs.push(tab);
        self.active = id;
        id
    }

    fn default_title(&self, request: &NewTab) -> String {
        if let (TabKind::Table, Some(table)) = (request.kind, request.table.as_deref()) {
            return table.to_string();
        }
        let base = request.kind.base_title();
        let same_kind = self.tabs.iter().filter(|t| t.kind == request.kind).count();
        if same_kind == 0 {
            base.to_string()
        } else {
            format!("{} {}", base, same_kind + 1)
        }
    }

    /// Close one tab.
    ///
    /// Closing the last tab replaces it with a fresh console. Closing the
    /// active tab focuses its left neighbour, or the new first tab.
    pub fn close(&mut self, id: Uuid) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        self.tabs.remove(pos);

        if self.tabs.is_empty() {
            self.replace_with_console();
        } else if self.active == id {
            self.active = self.tabs[pos.saturating_sub(1)].id;
        }
        true
    }

    /// Close every tab and start over with one console
    pub fn close_all(&mut self) {
        self.tabs.clear();
        self.replace_with_console();
    }

    pub fn close_others(&mut self, id: Uuid) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        self.tabs.retain(|t| t.id == id);
        self.active = id;
        true
    }

    /// Close every tab before `id`
    pub fn close_to_left(&mut self, id: Uuid) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        self.close_range(id, 0..pos);
        true
    }

    /// Close every tab after `id`
    pub fn close_to_right(&mut self, id: Uuid) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        let len = self.tabs.len();
        self.close_range(id, pos + 1..len);
        true
    }

    fn close_range(&mut self, keep: Uuid, range: std::ops::Range<usize>) {
        let removed_active = self.tabs[range.clone()].iter().any(|t| t.id == self.active);
        self.tabs.drain(range);
        if removed_active {
            self.active = keep;
        }
    }

    fn replace_with_console(&mut self) {
        let tab = Tab::console(self.connection_id.clone());
        self.active = tab.id;
        self.tabs.push(tab);
    }

    /// Merge a patch into a tab without touching focus
    pub fn update(&mut self, id: Uuid, patch: TabPatch) -> bool {
        match self.get_mut(id) {
            Some(tab) => {
                patch.apply(tab);
                true
            }
            None => false,
        }
    }

    pub fn set_active(&mut self, id: Uuid) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        self.active = id;
        true
    }

    /// Move a tab to `new_index`, clamped to the end of the strip
    pub fn reorder(&mut self, id: Uuid, new_index: usize) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        let tab = self.tabs.remove(pos);
        let index = new_index.min(self.tabs.len());
        self.tabs.insert(index, tab);
        true
    }
}

#[cfg(test)]
mod tests;
