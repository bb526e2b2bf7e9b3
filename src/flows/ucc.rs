//! Unique client code allocation on top of a [`SequenceStore`].

// self
use crate::{
	_prelude::*,
	auth::{ClientCode, UccIssuer, UccPrefix},
	error::AllocationError,
	flows::Gateway,
	http::GatewayHttpClient,
	obs::{self, FlowKind},
	store::SequenceStore,
};

/// Turns an identifier into a `"{issuer} {prefix} {NNN}"` client code.
///
/// Each call performs exactly one [`SequenceStore::increment`], so uniqueness is as strong
/// as the store's atomicity.
#[derive(Clone)]
pub struct UccAllocator {
	issuer: UccIssuer,
	sequences: Arc<dyn SequenceStore>,
}
impl UccAllocator {
	/// Creates an allocator issuing codes under `issuer`.
	pub fn new(issuer: UccIssuer, sequences: Arc<dyn SequenceStore>) -> Self {
		Self { issuer, sequences }
	}

	/// Issuer segment of every allocated code.
	pub fn issuer(&self) -> &UccIssuer {
		&self.issuer
	}

	/// Backing sequence store.
	pub fn sequences(&self) -> &Arc<dyn SequenceStore> {
		&self.sequences
	}

	/// Allocates the next code for the partition derived from `identifier`.
	pub async fn allocate(&self, identifier: &str) -> Result<ClientCode, AllocationError> {
		let prefix = UccPrefix::from_identifier(identifier)?;
		let sequence = self.sequences.increment(&prefix).await?;

		Ok(ClientCode::new(self.issuer.clone(), prefix, sequence))
	}
}
impl Debug for UccAllocator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("UccAllocator").field("issuer", &self.issuer).finish_non_exhaustive()
	}
}

impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Allocates a client code from `identifier` (typically the client's PAN).
	pub async fn allocate_ucc(&self, identifier: &str) -> Result<ClientCode> {
		obs::observe(FlowKind::UccAllocation, "allocate_ucc", async {
			self.allocator.allocate(identifier).await.map_err(Error::from)
		})
		.await
	}
}
