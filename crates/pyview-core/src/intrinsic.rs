//! # Intrinsics
//!
//! A side channel next to evaluate/children: the host (usually the companion
//! declarative description) sends a numeric id plus arguments and gets raw
//! bytes back. It is used for feature-flag queries that the description needs
//! to decide which nodes to show.
//!
//! ## Defined ids
//!
//! | id | intrinsic | response |
//! |----|-----------|----------|
//! | 1  | [`Intrinsic::ShowPythonViewNodes`] | one byte, `1` or `0` |

use uuid::Uuid;

use crate::error::{Result, VisualizerError};
use crate::types::StackFrame;

/// Intrinsics this visualizer answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Intrinsic
{
    /// Should native objects get a `[Python view]` node?
    ShowPythonViewNodes = 1,
}

impl Intrinsic
{
    /// Wire id.
    pub const fn id(self) -> u32
    {
        self as u32
    }
}

impl TryFrom<u32> for Intrinsic
{
    type Error = VisualizerError;

    fn try_from(id: u32) -> Result<Self>
    {
        match id {
            1 => Ok(Intrinsic::ShowPythonViewNodes),
            other => Err(VisualizerError::UnknownIntrinsic(other)),
        }
    }
}

/// One intrinsic call from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntrinsicRequest
{
    /// Intrinsic id
    pub id: u32,
    /// Host-assigned id of the caller, echoed in the response
    pub source_id: Uuid,
    /// Frame the call was made from; identifies the process
    pub frame: StackFrame,
    /// Raw arguments
    pub arguments: Vec<Vec<u8>>,
}

impl IntrinsicRequest
{
    /// A call to `intrinsic` without arguments.
    pub fn new(intrinsic: Intrinsic, source_id: Uuid, frame: StackFrame) -> Self
    {
        Self {
            id: intrinsic.id(),
            source_id,
            frame,
            arguments: Vec::new(),
        }
    }
}

/// Reply to an [`IntrinsicRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntrinsicResponse
{
    /// `source_id` of the request
    pub source_id: Uuid,
    /// Payload
    pub bytes: Vec<u8>,
}

impl IntrinsicResponse
{
    /// A one-byte boolean reply.
    pub fn flag(source_id: Uuid, value: bool) -> Self
    {
        Self {
            source_id,
            bytes: vec![u8::from(value)],
        }
    }

    /// Decode a one-byte boolean reply; `None` for any other payload.
    pub fn as_flag(&self) -> Option<bool>
    {
        match self.bytes.as_slice() {
            [0] => Some(false),
            [1] => Some(true),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_known_id()
    {
        assert_eq!(Intrinsic::try_from(1), Ok(Intrinsic::ShowPythonViewNodes));
        assert_eq!(Intrinsic::ShowPythonViewNodes.id(), 1);
    }

    #[test]
    fn test_unknown_ids_are_rejected()
    {
        for id in [0, 2, 42, u32::MAX] {
            assert_eq!(Intrinsic::try_from(id), Err(VisualizerError::UnknownIntrinsic(id)));
        }
    }

    #[test]
    fn test_flag_payload()
    {
        let source = Uuid::from_u128(7);
        assert_eq!(IntrinsicResponse::flag(source, true).bytes, vec![1]);
        assert_eq!(IntrinsicResponse::flag(source, false).as_flag(), Some(false));

        let odd = IntrinsicResponse {
            source_id: source,
            bytes: vec![1, 0],
        };
        assert_eq!(odd.as_flag(), None);
    }
}
