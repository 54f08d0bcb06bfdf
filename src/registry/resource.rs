//! # Resource Trait
//!
//! Every domain type rendered by the engine implements [`Resource`]. The trait only
//! exposes the object as [`Any`]: the registry finds its descriptor by type id and the
//! accessor table downcasts to the concrete type.
//!
//! Use [`impl_resource!`](crate::impl_resource) instead of writing the impl by hand.

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

/// A domain object that can be rendered into a document.
pub trait Resource: Any + Send + Sync + Debug {
    fn as_any(&self) -> &dyn Any;

    /// Rust type name, used in error messages in place of the object's contents.
    fn type_name(&self) -> &'static str;

    /// Views of embedded ancestor values, most specific first.
    ///
    /// A type that is not registered itself is resolved through the first ancestor
    /// whose type is registered.
    fn ancestors(&self) -> Vec<&dyn Any> {
        Vec::new()
    }
}

/// Shared handle to a domain object of any registered type.
pub type ResourceRef = Arc<dyn Resource>;

/// Implements [`Resource`] for a type.
///
/// ```rust
/// use resource_document::impl_resource;
///
/// #[derive(Debug)]
/// struct Task { id: u64 }
///
/// #[derive(Debug)]
/// struct Milestone { task: Task, due: String }
///
/// impl_resource!(Task);
/// impl_resource!(Milestone => task);
/// ```
#[macro_export]
macro_rules! impl_resource {
    ($ty:ty) => {
        impl $crate::registry::Resource for $ty {
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn type_name(&self) -> &'static str {
                ::std::any::type_name::<$ty>()
            }
        }
    };
    ($ty:ty => $($ancestor:ident),+) => {
        impl $crate::registry::Resource for $ty {
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn type_name(&self) -> &'static str {
                ::std::any::type_name::<$ty>()
            }

            fn ancestors(&self) -> Vec<&dyn ::std::any::Any> {
                vec![$(&self.$ancestor as &dyn ::std::any::Any),+]
            }
        }
    };
}
