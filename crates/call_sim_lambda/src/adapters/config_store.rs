use call_sim_core::contract::ConfigDocument;

pub trait ConfigStore {
    /// `Ok(None)` when the document does not exist.
    fn get_document(
        &self,
        collection: &str,
        document: &str,
    ) -> Result<Option<ConfigDocument>, String>;
}
