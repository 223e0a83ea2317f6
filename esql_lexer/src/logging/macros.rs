//! Logging macros; context values accept any `Display` type

/// Log an error with a [`Code`](crate::logging::Code), an optional span and context pairs
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::log_error_with_context($code, $message, None, vec![])
    };

    ($code:expr, $message:expr, span = $span:expr) => {
        $crate::logging::log_error_with_context($code, $message, Some($span), vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
        let context_refs: Vec<(&str, &str)> = context_strings
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        $crate::logging::log_error_with_context($code, $message, None, context_refs)
    }};

    ($code:expr, $message:expr, span = $span:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
        let context_refs: Vec<(&str, &str)> = context_strings
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        $crate::logging::log_error_with_context($code, $message, Some($span), context_refs)
    }};
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::log_success_with_context($code, $message, vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
        let context_refs: Vec<(&str, &str)> = context_strings
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        $crate::logging::log_success_with_context($code, $message, context_refs)
    }};
}

#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::log_info_with_context($message, vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
        let context_refs: Vec<(&str, &str)> = context_strings
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        $crate::logging::log_info_with_context($message, context_refs)
    }};
}

#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        $crate::logging::log_warning_with_context($message, vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
        let context_refs: Vec<(&str, &str)> = context_strings
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        $crate::logging::log_warning_with_context($message, context_refs)
    }};
}

/// Debug events skip context formatting entirely when debug output is off
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        if $crate::logging::debug_enabled() {
            $crate::logging::log_debug_with_context($message, vec![])
        }
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        if $crate::logging::debug_enabled() {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings
                .iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_debug_with_context($message, context_refs)
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::{codes, test_memory_logger};
    use crate::utils::{Position, Span};

    #[test]
    fn test_macros_forward_context() {
        let memory = test_memory_logger();
        let span = Span::new(Position::new(0, 1, 1), Position::new(1, 1, 2));

        crate::logging::with_query_context(515_151, "macro-test", || {
            log_error!(codes::lexical::UNRECOGNIZED_CHARACTER, "Unrecognized '$'", span = span, "mode" => "EXPRESSION");
            log_success!(codes::success::TOKENIZATION_COMPLETE, "done", "tokens" => 12);
            log_info!("info", "n" => 1);
            log_warning!("warn");
            log_debug!("debug", "depth" => 3);
        });

        let events = memory.get_events_with_context("query", "macro-test");
        assert_eq!(events.len(), 5);
        assert_eq!(events[0].span, Some(span));
        assert_eq!(events[0].context.get("mode").map(String::as_str), Some("EXPRESSION"));
        assert_eq!(events[1].context.get("tokens").map(String::as_str), Some("12"));
        assert!(events[3].is_warning());
        assert!(events[4].is_debug());
    }
}
