use crate::core::error::EngineError;
use crate::core::expense::Expense;
use crate::core::member::{Member, MemberId};
use crate::core::settlement::Settlement;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an expense-sharing group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A snapshot of one group: its members, expenses and settlements.
///
/// Records refer to members by [`MemberId`] only. Every mutator validates
/// before it changes anything, so a failed call leaves the group untouched.
///
/// # Examples
///
/// ```
/// use split_engine::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let mut group = Group::new("trip", "Weekend trip");
/// group.add_member(Member::new("a", "Ana")).unwrap();
/// group.add_member(Member::new("b", "Ben")).unwrap();
///
/// group
///     .record_settlement(Settlement::new(MemberId::new("b"), MemberId::new("a"), dec!(5)).unwrap())
///     .unwrap();
///
/// assert_eq!(group.member_count(), 2);
/// assert_eq!(group.settlements().len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GroupRecord")]
pub struct Group {
    id: GroupId,
    name: String,
    members: Vec<Member>,
    expenses: Vec<Expense>,
    settlements: Vec<Settlement>,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: GroupId::new(id),
            name: name.into(),
            members: Vec::new(),
            expenses: Vec::new(),
            settlements: Vec::new(),
        }
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }

    pub fn is_member(&self, id: &MemberId) -> bool {
        self.member(id).is_some()
    }

    /// Display names keyed by member id.
    pub fn member_names(&self) -> HashMap<MemberId, String> {
        self.members
            .iter()
            .map(|m| (m.id.clone(), m.name.clone()))
            .collect()
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    pub fn add_member(&mut self, member: Member) -> Result<(), EngineError> {
        if self.is_member(&member.id) {
            return Err(EngineError::DuplicateMember(member.id));
        }
        self.members.push(member);
        Ok(())
    }

    /// Remove a member who has no expenses or settlements in the group.
    pub fn remove_member(&mut self, id: &MemberId) -> Result<Member, EngineError> {
        let index = self
            .members
            .iter()
            .position(|m| &m.id == id)
            .ok_or_else(|| EngineError::UnknownMember(id.clone()))?;
        let in_use = self.expenses.iter().any(|e| e.involves(id))
            || self.settlements.iter().any(|s| s.involves(id));
        if in_use {
            return Err(EngineError::MemberInUse(id.clone()));
        }
        Ok(self.members.remove(index))
    }

    /// Add an expense whose payer and participants all belong to the group.
    pub fn record_expense(&mut self, expense: Expense) -> Result<Uuid, EngineError> {
        self.require_member(expense.payer())?;
        for split in expense.splits() {
            self.require_member(&split.member)?;
        }
        let id = expense.id();
        self.expenses.push(expense);
        Ok(id)
    }

    /// Add a settlement between two members of the group.
    pub fn record_settlement(&mut self, settlement: Settlement) -> Result<Uuid, EngineError> {
        self.require_member(settlement.from())?;
        self.require_member(settlement.to())?;
        let id = settlement.id();
        self.settlements.push(settlement);
        Ok(id)
    }

    /// Remove an expense together with its splits.
    pub fn remove_expense(&mut self, id: Uuid) -> Result<Expense, EngineError> {
        let index = self
            .expenses
            .iter()
            .position(|e| e.id() == id)
            .ok_or(EngineError::ExpenseNotFound(id))?;
        Ok(self.expenses.remove(index))
    }

    pub fn remove_settlement(&mut self, id: Uuid) -> Result<Settlement, EngineError> {
        let index = self
            .settlements
            .iter()
            .position(|s| s.id() == id)
            .ok_or(EngineError::SettlementNotFound(id))?;
        Ok(self.settlements.remove(index))
    }

    /// Expenses dated within `[start, end]`, inclusive on both ends.
    pub fn expenses_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Expense> {
        self.expenses
            .iter()
            .filter(|e| e.date() >= start && e.date() <= end)
            .collect()
    }

    /// Total of all expense amounts in the group.
    pub fn total_expenses(&self) -> Decimal {
        self.expenses.iter().map(|e| e.amount()).sum()
    }

    /// Total of all settlements recorded in the group.
    pub fn total_settled(&self) -> Decimal {
        self.settlements.iter().map(|s| s.amount()).sum()
    }

    /// Total settled from `from` to `to` in this direction only.
    pub fn total_settled_between(&self, from: &MemberId, to: &MemberId) -> Decimal {
        self.settlements
            .iter()
            .filter(|s| s.from() == from && s.to() == to)
            .map(|s| s.amount())
            .sum()
    }

    fn require_member(&self, id: &MemberId) -> Result<(), EngineError> {
        if self.is_member(id) {
            Ok(())
        } else {
            Err(EngineError::UnknownMember(id.clone()))
        }
    }
}

/// Serialized form of a [`Group`]. Rebuilt through the same mutators as a
/// live group, so membership is checked for every record.
#[derive(Deserialize)]
struct GroupRecord {
    id: GroupId,
    #[serde(default)]
    name: String,
    members: Vec<Member>,
    #[serde(default)]
    expenses: Vec<Expense>,
    #[serde(default)]
    settlements: Vec<Settlement>,
}

impl TryFrom<GroupRecord> for Group {
    type Error = EngineError;

    fn try_from(record: GroupRecord) -> Result<Self, Self::Error> {
        let mut group = Group {
            id: record.id,
            name: record.name,
            members: Vec::with_capacity(record.members.len()),
            expenses: Vec::with_capacity(record.expenses.len()),
            settlements: Vec::with_capacity(record.settlements.len()),
        };
        for member in record.members {
            group.add_member(member)?;
        }
        for expense in record.expenses {
            group.record_expense(expense)?;
        }
        for settlement in record.settlements {
            group.record_settlement(settlement)?;
        }
        Ok(group)
    }
}

/// The groups handed to the engine by the persistence layer, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    groups: HashMap<GroupId, Group>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a group, replacing any previous snapshot with the same id.
    pub fn insert(&mut self, group: Group) -> Option<Group> {
        self.groups.insert(group.id().clone(), group)
    }

    pub fn get(&self, id: &GroupId) -> Result<&Group, EngineError> {
        self.groups
            .get(id)
            .ok_or_else(|| EngineError::GroupNotFound(id.clone()))
    }

    pub fn get_mut(&mut self, id: &GroupId) -> Result<&mut Group, EngineError> {
        self.groups
            .get_mut(id)
            .ok_or_else(|| EngineError::GroupNotFound(id.clone()))
    }

    /// Remove a group along with all of its expenses, splits and settlements.
    pub fn remove(&mut self, id: &GroupId) -> Result<Group, EngineError> {
        self.groups
            .remove(id)
            .ok_or_else(|| EngineError::GroupNotFound(id.clone()))
    }

    /// Groups that `member` belongs to, ordered by group id.
    pub fn groups_of(&self, member: &MemberId) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self
            .groups
            .values()
            .filter(|g| g.is_member(member))
            .collect();
        groups.sort_by(|a, b| a.id().cmp(b.id()));
        groups
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<Group> for GroupRegistry {
    fn from_iter<T: IntoIterator<Item = Group>>(iter: T) -> Self {
        let mut registry = Self::new();
        for group in iter {
            registry.insert(group);
        }
        registry
    }
}
