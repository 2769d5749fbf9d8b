//! Tests for plain data types

use pyview_core::types::inspection::{CPP_LANGUAGE_ID, MICROSOFT_VENDOR_ID, PYTHON_LANGUAGE_ID};
use pyview_core::types::{
    Address, Architecture, EvaluationFlags, InspectionContext, Language, ProcessId, SessionId, ThreadId,
};
use uuid::Uuid;

#[test]
fn test_process_id_from_u32()
{
    let pid = ProcessId::from(12345);
    assert_eq!(pid.0, 12345);
}

#[test]
fn test_process_id_to_u32()
{
    let pid = ProcessId::from(54321);
    let value: u32 = pid.into();
    assert_eq!(value, 54321);
}

#[test]
fn test_address_display_and_math()
{
    let address = Address::from(0x1000);
    assert_eq!(address.to_string(), "0x0000000000001000");
    assert_eq!((address + 8).value(), 0x1008);
    assert!(address.is_aligned(8));
    assert!(!Address::new(0x1004).is_aligned(8));
    assert!(Address::ZERO.is_null());
    assert_eq!(Address::new(u64::MAX).checked_add(1), None);
}

#[test]
fn test_pointer_sizes()
{
    assert_eq!(Architecture::X86_64.pointer_size_bytes(), 8);
    assert_eq!(Architecture::Arm64.pointer_size_bytes(), 8);
    assert_eq!(Architecture::X86.pointer_size_bytes(), 4);
    assert_eq!(Architecture::Arm.pointer_size_bytes(), 4);
    assert_eq!(Architecture::X86_64.to_string(), "x86_64");
}

#[test]
fn test_python_identity_is_fixed()
{
    let vendor = Uuid::parse_str("994B45C4-E6E9-11D2-903F-00C04FA302A1").unwrap();
    let language = Uuid::parse_str("DA3C7D59-F9E4-4697-BEE7-3A0703AF6BFF").unwrap();

    assert_eq!(MICROSOFT_VENDOR_ID, vendor);
    assert_eq!(PYTHON_LANGUAGE_ID, language);
    assert_eq!(Language::PYTHON.compiler.vendor, vendor);
    assert_eq!(Language::PYTHON.compiler.language, language);
    assert_eq!(Language::PYTHON.to_string(), "Python");
    assert_eq!(Language::CPP.compiler.language, CPP_LANGUAGE_ID);
    assert!(!Language::PYTHON.same_identity(&Language::CPP));
}

#[test]
fn test_native_context_defaults()
{
    let context = InspectionContext::native(SessionId(1), ThreadId(2));
    assert_eq!(context.language, Language::CPP);
    assert_eq!(context.runtime, None);
    assert_eq!(context.radix, 10);
    assert_eq!(context.timeout, InspectionContext::DEFAULT_TIMEOUT);
    assert!(context.evaluation_flags.contains(EvaluationFlags::TREAT_AS_EXPRESSION));
}
