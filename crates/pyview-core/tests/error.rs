//! Tests for error handling

use std::error::Error;

use pyview_core::error::{BridgeError, MaterializeError, MemoryError, Result, SymbolError, VisualizerError};
use pyview_core::types::Address;

#[test]
fn test_not_implemented_names_operation()
{
    let error = VisualizerError::NotImplemented("get_children");
    let message = format!("{}", error);
    assert!(message.contains("not implemented"));
    assert!(message.contains("get_children"));
}

#[test]
fn test_unknown_intrinsic_names_id()
{
    let error = VisualizerError::UnknownIntrinsic(7);
    assert!(format!("{}", error).contains('7'));
}

#[test]
fn test_unreadable_memory_message()
{
    let error = MemoryError::Unreadable {
        address: Address::new(0x1000),
        len: 8,
    };
    let message = format!("{}", error);
    assert!(message.contains("8 bytes"));
    assert!(message.contains("0x0000000000001000"));
}

#[test]
fn test_materialize_error_keeps_memory_source()
{
    let source = MemoryError::Unreadable {
        address: Address::new(0x2008),
        len: 8,
    };
    let error = MaterializeError::Unreadable {
        address: Address::new(0x1000),
        source: source.clone(),
    };

    let inner = error.source().and_then(|err| err.downcast_ref::<MemoryError>());
    assert_eq!(inner, Some(&source));
}

#[test]
fn test_malformed_reason_is_shown()
{
    let error = MaterializeError::Malformed {
        address: Address::new(0x1000),
        reason: "ob_type is null".to_string(),
    };
    assert!(format!("{}", error).contains("ob_type is null"));
}

#[test]
fn test_bridge_error_messages()
{
    assert!(format!("{}", BridgeError::Timeout).contains("timed out"));
    assert!(format!("{}", BridgeError::Failed("boom".into())).contains("boom"));
    assert!(format!("{}", BridgeError::EvaluatorUnavailable("no frame".into())).contains("no frame"));
}

#[test]
fn test_symbol_error_from_io()
{
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing image");
    let error: SymbolError = io.into();
    assert!(matches!(error, SymbolError::Io(_)));
    assert!(format!("{}", error).contains("missing image"));
}

#[test]
fn test_result_type_alias()
{
    fn returns_result() -> Result<i32>
    {
        Ok(42)
    }

    fn returns_error() -> Result<i32>
    {
        Err(VisualizerError::NotSupported("no view".to_string()))
    }

    assert_eq!(returns_result().unwrap(), 42);
    assert!(returns_error().is_err());
}
