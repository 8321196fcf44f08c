/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `nodes`: Path resolution and folder/file mutations
/// - `boards`: Boards inside a project, and their ordering
/// - `tasks`: Tasks inside a board, and their ordering

pub mod boards;
pub mod health;
pub mod nodes;
pub mod tasks;

use crate::error::ApiError;
use kanbanfs_shared::ordering::Direction;
use serde::Deserialize;
use validator::Validate;

/// Body of the `shift` endpoints
///
/// Without `wrap` the row moves one place and `direction` must be -1 or 1.
/// With `wrap` it moves `direction` places around the container, so a
/// drag-and-drop client can send any non-zero offset.
#[derive(Debug, Deserialize)]
pub struct ShiftRequest {
    pub direction: i32,

    #[serde(default)]
    pub wrap: bool,
}

/// What a [`ShiftRequest`] asks the maintainer to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Step(Direction),
    Wrapping(i32),
}

impl ShiftRequest {
    pub fn shift(&self) -> Result<Shift, ApiError> {
        if self.wrap {
            if self.direction == 0 {
                return Err(ApiError::BadRequest("Direction must not be 0".to_string()));
            }
            return Ok(Shift::Wrapping(self.direction));
        }
        Direction::from_delta(self.direction)
            .map(Shift::Step)
            .ok_or_else(|| ApiError::BadRequest("Direction must be -1 or 1".to_string()))
    }
}

/// Body of the `move` endpoints
#[derive(Debug, Deserialize, Validate)]
pub struct MoveRequest {
    /// Destination container; defaults to the current one
    #[serde(alias = "board_id", alias = "node_id")]
    pub to: Option<uuid::Uuid>,

    /// Destination index; defaults to the end when changing container
    #[validate(range(min = 0, message = "Index must not be negative"))]
    pub index: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_request_step() {
        let right = ShiftRequest { direction: 1, wrap: false };
        assert_eq!(right.shift().unwrap(), Shift::Step(Direction::Right));

        let zero = ShiftRequest { direction: 0, wrap: false };
        assert!(matches!(zero.shift(), Err(ApiError::BadRequest(_))));

        let far = ShiftRequest { direction: 2, wrap: false };
        assert!(matches!(far.shift(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_shift_request_wrapping_takes_any_offset() {
        for direction in [-3, -1, 2, i32::MAX, i32::MIN] {
            let req = ShiftRequest { direction, wrap: true };
            assert_eq!(req.shift().unwrap(), Shift::Wrapping(direction));
        }

        let req: ShiftRequest =
            serde_json::from_value(serde_json::json!({ "direction": 0, "wrap": true })).unwrap();
        assert!(matches!(req.shift(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_move_request_rejects_negative_index() {
        let req = MoveRequest { to: None, index: Some(-1) };
        assert!(req.validate().is_err());

        let req: MoveRequest = serde_json::from_str("{}").unwrap();
        assert!(req.to.is_none() && req.index.is_none());
        assert!(req.validate().is_ok());

        let id = uuid::Uuid::new_v4();
        let req: MoveRequest =
            serde_json::from_value(serde_json::json!({ "board_id": id, "index": 0 })).unwrap();
        assert_eq!(req.to, Some(id));
    }
}
