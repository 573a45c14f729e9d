pub mod collection;
pub mod dashboard;
pub mod expense;
pub mod fields;
pub mod investment;
pub mod metrics;
pub mod settings;
pub mod subscription;

use collection::{Collection, RawDocument};

/// A fixed-shape record decoded from an untyped document.
pub trait Record: Clone + Send + Sync + 'static {
    /// The collection records of this type live in.
    const COLLECTION: Collection;

    /// Decode leniently: malformed fields take their documented defaults.
    fn from_document(doc: &RawDocument) -> Self;

    fn id(&self) -> &str;
}
