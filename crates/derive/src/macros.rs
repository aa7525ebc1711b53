//! Macros for use across derive.

/// [crate::ensure] is a short-hand for bubbling up errors in the case of a condition not being met.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err);
        }
    };
}

/// Increments a metric, optionally with label values.
#[macro_export]
macro_rules! inc {
    ($metric:ident) => {
        #[cfg(feature = "metrics")]
        $crate::metrics::$metric.inc();
    };
    ($metric:ident, $labels:expr) => {
        #[cfg(feature = "metrics")]
        $crate::metrics::$metric.with_label_values($labels).inc();
    };
}

/// Sets a metric value.
#[macro_export]
macro_rules! set {
    ($metric:ident, $value:expr) => {
        #[cfg(feature = "metrics")]
        $crate::metrics::$metric.set($value);
    };
}
