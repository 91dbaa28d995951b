//! Provider tokens
//!
//! A [`Token<T>`] is the typed handle application code declares once, usually
//! as a `const`:
//!
//! ```
//! use lazyboot_domain::Token;
//!
//! struct Settings;
//! const SETTINGS: Token<Settings> = Token::new("settings");
//!
//! assert_eq!(SETTINGS.erase().name(), "settings");
//! ```
//!
//! Containers key their registrations by the erased [`ProviderToken`], which
//! remembers the instance type so a lookup through the wrong `Token<T>` is
//! rejected instead of producing a bad downcast.

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Type-erased identifier naming a requestable capability
///
/// Equality and hashing use both the name and the instance type.
#[derive(Clone)]
pub struct ProviderToken {
    name: Cow<'static, str>,
    type_id: TypeId,
    type_name: &'static str,
}

impl ProviderToken {
    /// Create a token for instances of `T`
    pub fn of<T: 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Provider name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rust type name of the instances this token yields
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type id of the instances this token yields
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Whether this token yields instances of `T`
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl PartialEq for ProviderToken {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for ProviderToken {}

impl Hash for ProviderToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.type_id.hash(state);
    }
}

impl fmt::Display for ProviderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for ProviderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.type_name)
    }
}

/// Typed provider handle
pub struct Token<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Token<T> {
    /// Declare a token
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Provider name
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: 'static> Token<T> {
    /// Erase into the key containers register providers under
    pub fn erase(&self) -> ProviderToken {
        ProviderToken::of::<T>(self.name)
    }
}

impl<T> Clone for Token<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Token<T> {}

impl<T> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({}: {})", self.name, std::any::type_name::<T>())
    }
}

impl<T: 'static> From<Token<T>> for ProviderToken {
    fn from(token: Token<T>) -> Self {
        token.erase()
    }
}

impl<T: 'static> From<&Token<T>> for ProviderToken {
    fn from(token: &Token<T>) -> Self {
        token.erase()
    }
}
