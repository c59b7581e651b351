use crate::consumers::consumer::Consumer;

/// Types that resolve dependencies through an embedded [`Consumer`]
pub trait AsConsumer {
    fn as_consumer(&self) -> &Consumer;
}

impl AsConsumer for Consumer {
    fn as_consumer(&self) -> &Consumer {
        self
    }
}

/// Generate typed accessor methods for declared dependencies
///
/// Each listed accessor becomes a method calling [`Consumer::dependency`];
/// `name => predicate_method` also generates a presence check calling
/// [`Consumer::predicate`]. The target type must implement [`AsConsumer`].
///
/// ```ignore
/// struct Orchestrator {
///     consumer: Consumer,
/// }
///
/// impl AsConsumer for Orchestrator {
///     fn as_consumer(&self) -> &Consumer {
///         &self.consumer
///     }
/// }
///
/// dependency_accessors!(Orchestrator {
///     tools,
///     logger => has_logger,
/// });
/// ```
#[macro_export]
macro_rules! dependency_accessors {
    ($target:ty { $($accessor:ident $(=> $predicate:ident)?),* $(,)? }) => {
        impl $target {
            $(
                pub fn $accessor(
                    &self,
                ) -> ::std::result::Result<
                    ::std::option::Option<$crate::foundation::Value>,
                    $crate::errors::CoreError,
                > {
                    $crate::consumers::AsConsumer::as_consumer(self).dependency(stringify!($accessor))
                }

                $(
                    pub fn $predicate(&self) -> ::std::result::Result<bool, $crate::errors::CoreError> {
                        $crate::consumers::AsConsumer::as_consumer(self).predicate(stringify!($accessor))
                    }
                )?
            )*
        }
    };
}
