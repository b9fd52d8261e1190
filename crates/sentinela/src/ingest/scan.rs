//! Selection state over the backend's local-scan folder.

use tracing::info;

use crate::client::IngestApi;
use crate::error::{IngestError, Result};
use crate::model::{DocType, IngestItem, ProcessReceipt, ProcessRequest, ScanFile, Sphere};

/// One listed file and the operator's choices for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanEntry {
    pub file: ScanFile,
    pub selected: bool,
    pub doc_type: DocType,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanSelection {
    entries: Vec<ScanEntry>,
}

impl ScanSelection {
    /// Every file starts selected, typed as `documento`.
    pub fn new(files: Vec<ScanFile>) -> Self {
        let entries = files
            .into_iter()
            .map(|file| ScanEntry {
                file,
                selected: true,
                doc_type: DocType::Documento,
            })
            .collect();
        Self { entries }
    }

    /// Fetches the listing.
    pub async fn load<A: IngestApi + ?Sized>(api: &A) -> Result<Self> {
        let files = api.list_scan_files().await?;
        info!(count = files.len(), "scan folder listed");
        Ok(Self::new(files))
    }

    pub fn entries(&self) -> &[ScanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn selected(&self) -> impl Iterator<Item = &ScanEntry> {
        self.entries.iter().filter(|e| e.selected)
    }

    pub fn selected_count(&self) -> usize {
        self.selected().count()
    }

    pub fn all_selected(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|e| e.selected)
    }

    fn entry_mut(&mut self, filename: &str) -> std::result::Result<&mut ScanEntry, IngestError> {
        self.entries
            .iter_mut()
            .find(|e| e.file.filename == filename)
            .ok_or_else(|| IngestError::UnknownFile(filename.to_string()))
    }

    /// Flips one file. Returns its new selection state.
    pub fn toggle(&mut self, filename: &str) -> std::result::Result<bool, IngestError> {
        let entry = self.entry_mut(filename)?;
        entry.selected = !entry.selected;
        Ok(entry.selected)
    }

    pub fn set_selected(
        &mut self,
        filename: &str,
        selected: bool,
    ) -> std::result::Result<(), IngestError> {
        self.entry_mut(filename)?.selected = selected;
        Ok(())
    }

    /// All selected → none selected, otherwise everything selected.
    pub fn toggle_all(&mut self) {
        let select = !self.all_selected();
        for entry in &mut self.entries {
            entry.selected = select;
        }
    }

    pub fn set_doc_type(
        &mut self,
        filename: &str,
        doc_type: DocType,
    ) -> std::result::Result<(), IngestError> {
        self.entry_mut(filename)?.doc_type = doc_type;
        Ok(())
    }

    /// Returns how many entries were retyped.
    pub fn apply_type_to_selected(&mut self, doc_type: &DocType) -> usize {
        let mut count = 0;
        for entry in self.entries.iter_mut().filter(|e| e.selected) {
            entry.doc_type = doc_type.clone();
            count += 1;
        }
        count
    }

    /// Builds the process payload. The sphere is left for the backend to infer.
    pub fn to_request(&self, tags: &str) -> std::result::Result<ProcessRequest, IngestError> {
        let items: Vec<IngestItem> = self
            .selected()
            .map(|e| IngestItem {
                filename: e.file.filename.clone(),
                doc_type: e.doc_type.clone(),
                sphere: Sphere::Unknown,
                tags: tags.trim().to_string(),
            })
            .collect();
        if items.is_empty() {
            return Err(IngestError::EmptySelection);
        }
        Ok(ProcessRequest { items })
    }

    pub async fn process<A: IngestApi + ?Sized>(
        &self,
        api: &A,
        tags: &str,
    ) -> Result<ProcessReceipt> {
        let request = self.to_request(tags)?;
        info!(count = request.items.len(), "sending scan files for processing");
        Ok(api.process_scan(&request).await?)
    }
}
