//! Per-request option carrier
//!
//! Middleware read their defaults from their own configuration, but a caller
//! can override them for a single request by attaching a [`RequestOption`]
//! to that request. Options live in a [`RequestOptions`] map stored in the
//! request's extensions and are looked up by a [`RequestOptionKey`].

use http::Request;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Unique name of an option inside a [`RequestOptions`] carrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestOptionKey(&'static str);

impl RequestOptionKey {
    /// Create a key from a static identifier
    pub const fn new(key: &'static str) -> Self {
        Self(key)
    }

    /// The identifier backing this key
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for RequestOptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A typed option that can be attached to a single request
pub trait RequestOption: Any + Send + Sync + fmt::Debug {
    /// Key the option is stored under
    fn key(&self) -> RequestOptionKey;

    /// Upcast used for typed lookups
    fn as_any(&self) -> &dyn Any;
}

/// Map of request options keyed by [`RequestOptionKey`]
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    options: HashMap<RequestOptionKey, Arc<dyn RequestOption>>,
}

impl RequestOptions {
    /// Create an empty carrier
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an option under its own key, replacing any previous value
    pub fn insert<O: RequestOption>(&mut self, option: O) -> Option<Arc<dyn RequestOption>> {
        self.options.insert(option.key(), Arc::new(option))
    }

    /// Get the option stored under `key`, whatever its type
    pub fn get(&self, key: RequestOptionKey) -> Option<&dyn RequestOption> {
        self.options.get(&key).map(|option| &**option)
    }

    /// Get the option stored under `key` as a `T`
    ///
    /// Returns `None` when nothing is stored or the stored value is another type.
    pub fn get_as<T: RequestOption>(&self, key: RequestOptionKey) -> Option<&T> {
        self.get(key)?.as_any().downcast_ref::<T>()
    }

    /// Remove the option stored under `key`
    pub fn remove(&mut self, key: RequestOptionKey) -> Option<Arc<dyn RequestOption>> {
        self.options.remove(&key)
    }

    /// Number of stored options
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether no options are stored
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Access to the option carrier of an [`http::Request`]
pub trait RequestOptionsExt {
    /// The request's option carrier, if one was attached
    fn request_options(&self) -> Option<&RequestOptions>;

    /// Attach `option`, creating the carrier if needed
    fn insert_request_option<O: RequestOption>(&mut self, option: O);

    /// Builder-style variant of [`RequestOptionsExt::insert_request_option`]
    fn with_request_option<O: RequestOption>(mut self, option: O) -> Self
    where
        Self: Sized,
    {
        self.insert_request_option(option);
        self
    }
}

impl<B> RequestOptionsExt for Request<B> {
    fn request_options(&self) -> Option<&RequestOptions> {
        self.extensions().get::<RequestOptions>()
    }

    fn insert_request_option<O: RequestOption>(&mut self, option: O) {
        let extensions = self.extensions_mut();
        match extensions.get_mut::<RequestOptions>() {
            Some(options) => {
                options.insert(option);
            }
            None => {
                let mut options = RequestOptions::new();
                options.insert(option);
                extensions.insert(options);
            }
        }
    }
}
