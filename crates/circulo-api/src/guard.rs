//! Ownership checks. The only rule: callers act on themselves, except for
//! follow/unfollow where they must act on someone else.

use crate::error::ApiError;
use crate::middleware::AuthUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfAction {
    UpdateProfile,
    DeleteProfile,
    ChangePassword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetAction {
    Follow,
    Unfollow,
}

/// Allow only when the caller is the owner of the resource.
pub fn authorize_self(caller: AuthUser, owner_id: u64, action: SelfAction) -> Result<(), ApiError> {
    if caller.0 == owner_id {
        return Ok(());
    }
    Err(ApiError::Forbidden(match action {
        SelfAction::UpdateProfile => "não é possível atualizar um usuário que não seja o logado",
        SelfAction::DeleteProfile => "não é possível deletar um usuário que não seja o logado",
        SelfAction::ChangePassword => "você não pode mudar a senha de outro usuário",
    }))
}

/// Allow only when the caller targets someone other than themself.
pub fn authorize_other(caller: AuthUser, target_id: u64, action: TargetAction) -> Result<(), ApiError> {
    if caller.0 != target_id {
        return Ok(());
    }
    Err(ApiError::Validation(
        match action {
            TargetAction::Follow => "um usuário não pode seguir ele mesmo",
            TargetAction::Unfollow => "um usuário não pode deixar de seguir ele mesmo",
        }
        .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn self_actions_require_equal_ids() {
        for action in [SelfAction::UpdateProfile, SelfAction::DeleteProfile, SelfAction::ChangePassword] {
            assert!(authorize_self(AuthUser(3), 3, action).is_ok());
            let err = authorize_self(AuthUser(3), 4, action).unwrap_err();
            assert_eq!(err.status(), StatusCode::FORBIDDEN);
        }
    }

    #[test]
    fn target_actions_require_different_ids() {
        for action in [TargetAction::Follow, TargetAction::Unfollow] {
            assert!(authorize_other(AuthUser(3), 4, action).is_ok());
            let err = authorize_other(AuthUser(3), 3, action).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn follow_self_message() {
        let err = authorize_other(AuthUser(1), 1, TargetAction::Follow).unwrap_err();
        assert_eq!(err.to_string(), "um usuário não pode seguir ele mesmo");
    }
}
