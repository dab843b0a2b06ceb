//! Fake data providers for filling response values with synthetic content.
//!
//! A provider is the single pluggable piece of the response pipeline: the
//! library decides *when* and *how many* values to produce, the provider
//! decides *what* goes inside them. Providers can be installed as a
//! mux-wide default or overridden per endpoint.

use std::any::{type_name, Any};
use std::marker::PhantomData;
use std::sync::Arc;

/// Error type produced by fake data providers.
///
/// Providers come from application code, so any error type is accepted;
/// failures are surfaced to HTTP clients as 500 responses.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

/// Capability for filling a target value with fake data.
///
/// The target is passed as `&mut dyn Any` so a single provider value can
/// serve endpoints registered for different response shapes. Typed
/// implementations are usually built with [`provider_fn`], which handles
/// the downcast.
pub trait FakeDataProvider: Send + Sync {
    /// Fill `target` with fake data in place.
    ///
    /// # Parameters
    ///
    /// - `target` - Value to populate; its concrete type is the `T` the
    ///   endpoint was registered with
    ///
    /// # Returns
    ///
    /// Returns `Ok(())` on success, or the provider's own error, which the
    /// synthesizer reports as an internal server error.
    fn fill(&self, target: &mut dyn Any) -> Result<(), ProviderError>;
}

/// Typed adapter implementing [`FakeDataProvider`] for a closure over `T`.
struct ProviderFn<T, F> {
    fill: F,
    _marker: PhantomData<fn(&mut T)>,
}

impl<T, F> FakeDataProvider for ProviderFn<T, F>
where
    T: 'static,
    F: Fn(&mut T) -> Result<(), ProviderError> + Send + Sync,
{
    fn fill(&self, target: &mut dyn Any) -> Result<(), ProviderError> {
        match target.downcast_mut::<T>() {
            Some(value) => (self.fill)(value),
            None => Err(format!(
                "provider expects target of type {}, endpoint registered a different shape",
                type_name::<T>()
            )
            .into()),
        }
    }
}

/// Wrap a typed closure into a shareable [`FakeDataProvider`].
///
/// # Parameters
///
/// - `fill` - Closure populating a `&mut T` with fake data
///
/// # Returns
///
/// Returns an `Arc<dyn FakeDataProvider>` suitable for
/// [`Mux::set_default_provider`](crate::Mux::set_default_provider) or the
/// `provider` field of [`EndpointConfig`](crate::EndpointConfig).
///
/// # Examples
///
/// ```
/// use faux_mock_rs::provider_fn;
///
/// #[derive(Default)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// let provider = provider_fn::<User, _>(|user| {
///     user.id = 1;
///     user.name = "Doe".to_string();
///     Ok(())
/// });
/// ```
pub fn provider_fn<T, F>(fill: F) -> Arc<dyn FakeDataProvider>
where
    T: 'static,
    F: Fn(&mut T) -> Result<(), ProviderError> + Send + Sync + 'static,
{
    Arc::new(ProviderFn { fill, _marker: PhantomData })
}
