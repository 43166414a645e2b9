//! Resource handles.
//!
//! A handle pairs the last fetched snapshot of a resource with the client
//! that produced it. Mutating calls go through the client and replace the
//! snapshot with the canonical state the API returns.

/// A live resource: model snapshot plus its client.
#[derive(Debug, Clone)]
pub struct Resource<C, M> {
    client: C,
    model: M,
}

impl<C, M> Resource<C, M> {
    pub(crate) const fn new(client: C, model: M) -> Self {
        Self { client, model }
    }

    /// Snapshot of the resource as of the last fetch.
    #[must_use]
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Consume the handle, keeping the snapshot.
    #[must_use]
    pub fn into_model(self) -> M {
        self.model
    }

    /// Client this handle was produced by.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    pub(crate) fn replace_model(&mut self, fresh: Self) {
        self.model = fresh.model;
    }
}
