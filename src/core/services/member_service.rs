use crate::domain::{Group, Member, MemberId};
use crate::errors::LedgerError;

use super::ServiceResult;

pub struct MemberService;

impl MemberService {
    pub fn add(group: &mut Group, name: &str, avatar: Option<String>) -> ServiceResult<MemberId> {
        let name = Self::validate_name(group, None, name)?;
        let mut member = Member::new(name);
        if let Some(avatar) = avatar
            .map(|avatar| avatar.trim().to_string())
            .filter(|avatar| !avatar.is_empty())
        {
            member = member.with_avatar(avatar);
        }
        let id = member.id.clone();
        group.members.push(member);
        Ok(id)
    }

    /// Returns the member's previous name.
    pub fn rename(group: &mut Group, id: &MemberId, name: &str) -> ServiceResult<String> {
        if !group.has_member(id) {
            return Err(LedgerError::not_found(format!("member {}", id)));
        }
        let name = Self::validate_name(group, Some(id), name)?;
        let member = group
            .member_mut(id)
            .ok_or_else(|| LedgerError::not_found(format!("member {}", id)))?;
        Ok(std::mem::replace(&mut member.name, name))
    }

    /// Removal is blocked while any expense still references the member.
    pub fn remove(group: &mut Group, id: &MemberId) -> ServiceResult<Member> {
        let position = group
            .members
            .iter()
            .position(|member| &member.id == id)
            .ok_or_else(|| LedgerError::not_found(format!("member {}", id)))?;
        if group.member_in_use(id) {
            return Err(LedgerError::conflict(format!(
                "member `{}` is still referenced by expenses",
                group.members[position].name
            )));
        }
        Ok(group.members.remove(position))
    }

    /// Trims `candidate` and checks it is non-empty and unique (case-insensitive).
    pub fn validate_name(
        group: &Group,
        exclude: Option<&MemberId>,
        candidate: &str,
    ) -> ServiceResult<String> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::validation("member name must not be empty"));
        }
        let normalized = trimmed.to_lowercase();
        let duplicate = group.members.iter().any(|member| {
            member.name.trim().to_lowercase() == normalized
                && exclude.map_or(true, |id| &member.id != id)
        });
        if duplicate {
            Err(LedgerError::validation(format!(
                "member `{}` already exists",
                trimmed
            )))
        } else {
            Ok(trimmed.to_string())
        }
    }
}
