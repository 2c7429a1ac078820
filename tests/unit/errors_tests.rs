/*!
 * Tests for error types and their retry classification
 */

use chapterwai::errors::{AppError, ProviderError, TranslationError};

/// Test which provider failures are worth retrying
#[test]
fn test_providerError_isRetryable_shouldSplitTransientFromFatal() {
    let transient = [
        ProviderError::RateLimited("429".into()),
        ProviderError::ServerUnavailable { status_code: 503, message: "busy".into() },
        ProviderError::Connection("reset".into()),
        ProviderError::EmptyResponse("no text".into()),
    ];
    let fatal = [
        ProviderError::ClientRejected { status_code: 400, message: "bad".into() },
        ProviderError::Parse("not json".into()),
        ProviderError::Configuration("missing key".into()),
    ];

    assert!(transient.iter().all(ProviderError::is_retryable));
    assert!(!fatal.iter().any(ProviderError::is_retryable));
}

/// Test provider error conversion into translation errors
#[test]
fn test_translationError_fromProviderError_shouldWrap() {
    let error: TranslationError = ProviderError::RateLimited("quota".into()).into();
    assert!(matches!(error, TranslationError::Provider(ProviderError::RateLimited(_))));
    assert!(error.to_string().contains("quota"));
}

/// Test the truncation error message
#[test]
fn test_suspiciouslyShort_display_shouldNameChapterAndCounts() {
    let error = TranslationError::SuspiciouslyShort { chapter: 12, output_chars: 40, input_chars: 900 };
    let message = error.to_string();
    assert!(message.contains("Chapter 12"));
    assert!(message.contains("40"));
    assert!(message.contains("900"));
}

/// Test conversions into the application error
#[test]
fn test_appError_conversions_shouldPickMatchingVariant() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(AppError::from(io), AppError::File(_)));

    let translation = TranslationError::Storage("disk full".into());
    assert!(matches!(AppError::from(translation), AppError::Translation(_)));

    let other = anyhow::anyhow!("something odd");
    assert!(matches!(AppError::from(other), AppError::Unknown(_)));
}
