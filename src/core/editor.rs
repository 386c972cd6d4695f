//! Document editor controller
//!
//! Owns the authoritative content model (the history snapshot under the
//! cursor), keeps the editing surface in sync with it, and talks to the
//! document store.
//!
//! Store calls are split in three steps so the editor stays interactive
//! while a request is outstanding: `begin_*` captures everything the request
//! needs into an owned pending value, `run` performs the call without
//! borrowing the controller, and `finish_*` applies the outcome.

use std::sync::Arc;

use super::config::EditorConfig;
use super::document::{
    encode_content, Document, DocumentId, DocumentPatch, DocumentSummary, StoredDocument,
};
use super::error::EditorError;
use super::history::EditHistory;
use super::markup;
use super::notification::Notification;
use super::surface::{EditingSurface, MarkupSurface};
use super::command::ToolbarCommand;
use crate::store::{DocumentStore, StoreError};

/// Lifecycle of the editor's document session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// No document adopted yet
    Empty,
    /// A create or load request is outstanding
    Loading,
    /// A document is displayed and no save is outstanding
    Ready,
    /// At least one save is outstanding; editing continues
    Saving,
}

/// What to do after the document list arrives and nothing is open yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Followup {
    /// Open the most recently updated document
    Load(DocumentId),
    /// The owner has no documents; start a new one
    Create,
}

/// Outstanding create request
pub struct PendingCreate {
    ticket: u64,
    store: Arc<dyn DocumentStore>,
    owner_id: String,
    title: String,
}

/// Result of a create request
#[derive(Debug)]
pub struct CreateFinished {
    ticket: u64,
    result: Result<StoredDocument, StoreError>,
}

impl PendingCreate {
    pub async fn run(self) -> CreateFinished {
        let result = self
            .store
            .create(&self.owner_id, &self.title, &encode_content(""))
            .await;
        CreateFinished {
            ticket: self.ticket,
            result,
        }
    }
}

/// Outstanding load request
pub struct PendingLoad {
    ticket: u64,
    store: Arc<dyn DocumentStore>,
    id: DocumentId,
}

/// Result of a load request
#[derive(Debug)]
pub struct LoadFinished {
    ticket: u64,
    id: DocumentId,
    result: Result<StoredDocument, StoreError>,
}

impl PendingLoad {
    pub async fn run(self) -> LoadFinished {
        let result = self.store.get(&self.id).await;
        LoadFinished {
            ticket: self.ticket,
            id: self.id,
            result,
        }
    }
}

/// Outstanding save, holding the content captured when it was issued
pub struct PendingSave {
    store: Arc<dyn DocumentStore>,
    id: DocumentId,
    patch: DocumentPatch,
}

/// Result of a save request
#[derive(Debug)]
pub struct SaveFinished {
    id: DocumentId,
    result: Result<(), StoreError>,
}

impl PendingSave {
    pub async fn run(self) -> SaveFinished {
        let result = self.store.update(&self.id, &self.patch).await;
        SaveFinished {
            id: self.id,
            result,
        }
    }
}

/// Outstanding document list request
pub struct PendingList {
    generation: u64,
    store: Arc<dyn DocumentStore>,
    owner_id: String,
}

/// Result of a document list request
#[derive(Debug)]
pub struct ListFinished {
    generation: u64,
    result: Result<Vec<DocumentSummary>, StoreError>,
}

impl PendingList {
    pub async fn run(self) -> ListFinished {
        ListFinished {
            generation: self.generation,
            result: self.store.list(&self.owner_id).await,
        }
    }
}

/// Editor for one document at a time
pub struct EditorController<S: EditingSurface = MarkupSurface> {
    store: Arc<dyn DocumentStore>,
    owner_id: String,
    surface: S,
    document: Option<Document>,
    history: EditHistory,
    word_count: usize,
    /// Ticket of the create/load request whose result will be adopted
    pending_open: Option<u64>,
    last_ticket: u64,
    saves_in_flight: usize,
    /// Bumped on store switch; list results from older stores are dropped
    store_generation: u64,
    documents: Vec<DocumentSummary>,
    notifications: Vec<Notification>,
    placeholder_title: String,
    citation_marker: String,
}

impl<S: EditingSurface> EditorController<S> {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        owner_id: impl Into<String>,
        mut surface: S,
        config: &EditorConfig,
    ) -> Self {
        surface.set_serialized_content("");
        Self {
            store,
            owner_id: owner_id.into(),
            surface,
            document: None,
            history: EditHistory::new("", config.history_limit),
            word_count: 0,
            pending_open: None,
            last_ticket: 0,
            saves_in_flight: 0,
            store_generation: 0,
            documents: Vec::new(),
            notifications: Vec::new(),
            placeholder_title: config.placeholder_title.clone(),
            citation_marker: config.citation_marker.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> EditorState {
        if self.pending_open.is_some() {
            EditorState::Loading
        } else if self.document.is_none() {
            EditorState::Empty
        } else if self.saves_in_flight > 0 {
            EditorState::Saving
        } else {
            EditorState::Ready
        }
    }

    /// Displayed content
    pub fn content(&self) -> &str {
        self.history.current()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn documents(&self) -> &[DocumentSummary] {
        &self.documents
    }

    pub fn store_description(&self) -> String {
        self.store.describe()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable surface access for widgets that edit it in place
    ///
    /// Changes made here must be reported back through [`Self::apply_edit`].
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Drain notifications raised since the last call
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    // ------------------------------------------------------------------
    // Create / load
    // ------------------------------------------------------------------

    pub fn begin_create(&mut self) -> PendingCreate {
        let ticket = self.open_ticket();
        tracing::debug!("Creating document (request {})", ticket);
        PendingCreate {
            ticket,
            store: Arc::clone(&self.store),
            owner_id: self.owner_id.clone(),
            title: self.placeholder_title.clone(),
        }
    }

    pub fn finish_create(&mut self, done: CreateFinished) {
        if !self.accept_ticket(done.ticket) {
            return;
        }

        let adopted = done
            .result
            .map_err(EditorError::from)
            .and_then(|stored| Document::from_stored(stored).map_err(EditorError::from));
        match adopted {
            Ok(document) => {
                tracing::info!("Created document {:?}", document.id);
                self.adopt(document);
                self.notify(Notification::success(
                    "Document Created",
                    "A new document is ready for writing.",
                ));
            }
            Err(e) => self.fail("Error creating document", e),
        }
    }

    pub fn begin_load(&mut self, id: DocumentId) -> PendingLoad {
        let ticket = self.open_ticket();
        tracing::debug!("Loading document {} (request {})", id, ticket);
        PendingLoad {
            ticket,
            store: Arc::clone(&self.store),
            id,
        }
    }

    pub fn finish_load(&mut self, done: LoadFinished) {
        if !self.accept_ticket(done.ticket) {
            return;
        }

        let adopted = done
            .result
            .map_err(EditorError::from)
            .and_then(|stored| Document::from_stored(stored).map_err(EditorError::from));
        match adopted {
            Ok(document) => {
                tracing::info!("Loaded document {}", done.id);
                self.adopt(document);
            }
            Err(e) => self.fail("Error loading document", e),
        }
    }

    pub async fn create_document(&mut self) {
        let pending = self.begin_create();
        let done = pending.run().await;
        self.finish_create(done);
    }

    pub async fn load_document(&mut self, id: DocumentId) {
        let pending = self.begin_load(id);
        let done = pending.run().await;
        self.finish_load(done);
    }

    fn open_ticket(&mut self) -> u64 {
        self.last_ticket += 1;
        self.pending_open = Some(self.last_ticket);
        self.last_ticket
    }

    /// Only the most recent create/load is adopted
    fn accept_ticket(&mut self, ticket: u64) -> bool {
        if self.pending_open != Some(ticket) {
            tracing::debug!("Discarding superseded result of request {}", ticket);
            return false;
        }
        self.pending_open = None;
        true
    }

    fn adopt(&mut self, document: Document) {
        self.history.reset(document.content.clone());
        self.surface.set_serialized_content(&document.content);
        self.word_count = markup::markup_word_count(&document.content);
        self.document = Some(document);
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Record a content change reported by the surface (or made programmatically)
    pub fn apply_edit(&mut self, new_content: impl Into<String>) {
        let new_content = new_content.into();
        if self.surface.serialized_content() != new_content {
            self.surface.set_serialized_content(&new_content);
        }
        if self.history.push(new_content) {
            self.sync_model();
        }
    }

    /// Step back one snapshot; false at the oldest snapshot
    pub fn undo(&mut self) -> bool {
        if self.history.undo().is_none() {
            return false;
        }
        self.show_current();
        true
    }

    /// Step forward one snapshot; false at the newest snapshot
    pub fn redo(&mut self) -> bool {
        if self.history.redo().is_none() {
            return false;
        }
        self.show_current();
        true
    }

    pub fn run_toolbar_command(&mut self, command: ToolbarCommand) {
        tracing::debug!("Toolbar command {:?}", command);
        self.surface.apply_command(command);
        let content = self.surface.serialized_content();
        self.apply_edit(content);
    }

    pub fn insert_citation_placeholder(&mut self) {
        self.surface.insert_markup(&self.citation_marker);
        let content = self.surface.serialized_content();
        self.apply_edit(content);
        self.notify(Notification::info(
            "Citation Added",
            "A placeholder citation has been added. Connect your sources!",
        ));
    }

    /// Insert plain text (an assistant reply) at the caret as paragraphs
    pub fn insert_text(&mut self, text: &str) {
        let markup = markup::paragraphs(text);
        if markup.is_empty() {
            return;
        }
        self.surface.insert_markup(&markup);
        let content = self.surface.serialized_content();
        self.apply_edit(content);
    }

    /// Selected text to seed an AI request with, empty without a selection
    pub fn compute_ai_context(&self) -> String {
        let selected = self.surface.selected_plain_text();
        if selected.trim().is_empty() {
            String::new()
        } else {
            selected
        }
    }

    /// Plain text of the whole document
    pub fn plain_text(&self) -> String {
        markup::plain_text(self.content())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        if let Some(document) = self.document.as_mut() {
            document.title = title.into();
        }
    }

    fn show_current(&mut self) {
        let current = self.history.current().to_string();
        self.surface.set_serialized_content(&current);
        self.sync_model();
    }

    fn sync_model(&mut self) {
        let current = self.history.current();
        self.word_count = markup::markup_word_count(current);
        if let Some(document) = self.document.as_mut() {
            document.content = current.to_string();
        }
    }

    // ------------------------------------------------------------------
    // Save
    // ------------------------------------------------------------------

    /// Capture the displayed content for saving
    ///
    /// Fails without contacting the store when no document is open.
    pub fn begin_save(&mut self) -> Result<PendingSave, EditorError> {
        let Some((id, title)) = self
            .document
            .as_ref()
            .and_then(|doc| doc.id.clone().map(|id| (id, doc.title.clone())))
        else {
            self.fail("Error saving document", EditorError::NoActiveDocument);
            return Err(EditorError::NoActiveDocument);
        };

        self.saves_in_flight += 1;
        tracing::debug!("Saving document {} ({} in flight)", id, self.saves_in_flight);
        Ok(PendingSave {
            store: Arc::clone(&self.store),
            id,
            patch: DocumentPatch {
                title: Some(title),
                content: Some(encode_content(self.content())),
            },
        })
    }

    pub fn finish_save(&mut self, done: SaveFinished) {
        self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
        match done.result {
            Ok(()) => {
                tracing::info!("Saved document {}", done.id);
                self.notify(Notification::success(
                    "Document Saved",
                    "Your changes have been saved.",
                ));
            }
            Err(e) => self.fail("Error saving document", e.into()),
        }
    }

    pub async fn save(&mut self) {
        if let Ok(pending) = self.begin_save() {
            let done = pending.run().await;
            self.finish_save(done);
        }
    }

    // ------------------------------------------------------------------
    // Document list
    // ------------------------------------------------------------------

    pub fn begin_list(&self) -> PendingList {
        PendingList {
            generation: self.store_generation,
            store: Arc::clone(&self.store),
            owner_id: self.owner_id.clone(),
        }
    }

    /// Store the list; suggests what to open when nothing is open yet
    pub fn finish_list(&mut self, done: ListFinished) -> Option<Followup> {
        if done.generation != self.store_generation {
            tracing::debug!("Discarding document list from a previous store");
            return None;
        }
        match done.result {
            Ok(documents) => {
                tracing::debug!("Listed {} documents", documents.len());
                self.documents = documents;
                if self.document.is_some() || self.pending_open.is_some() {
                    return None;
                }
                Some(match self.documents.first() {
                    Some(latest) => Followup::Load(latest.id.clone()),
                    None => Followup::Create,
                })
            }
            Err(e) => {
                self.fail("Error fetching documents", e.into());
                None
            }
        }
    }

    /// Refresh the list and open something if nothing is open
    pub async fn refresh_documents(&mut self) {
        let done = self.begin_list().run().await;
        match self.finish_list(done) {
            Some(Followup::Load(id)) => self.load_document(id).await,
            Some(Followup::Create) => self.create_document().await,
            None => {}
        }
    }

    /// Point the editor at another store, closing the current document
    pub fn switch_store(&mut self, store: Arc<dyn DocumentStore>) {
        tracing::info!("Switching document store to {}", store.describe());
        self.store = store;
        self.store_generation += 1;
        self.document = None;
        self.documents.clear();
        self.pending_open = None;
        self.history.reset("");
        self.surface.set_serialized_content("");
        self.word_count = 0;
    }

    fn fail(&mut self, title: &str, err: EditorError) {
        tracing::warn!("{}: {}", title, err);
        self.notify(Notification::error(title, err.to_string()));
    }
}
