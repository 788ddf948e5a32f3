//! Form state machine shared by the add, edit and remove commands
//!
//! ```text
//! Open --submit--> (invalid: Open) | Confirming(plan)
//! Confirming --reject--> Open
//! Confirming --accept--> Applied(outcome)
//! Open | Confirming --cancel--> Cancelled
//! ```
//!
//! The line items are only touched on `accept`.

use crate::core::item::LineItem;
use crate::core::ops::{
    add_item, apply_edit, apply_removal, AddOutcome, EditPlan, OpError, RemovalOutcome,
    RemovalPlan,
};
use crate::core::schema::CategorySchema;
use crate::core::validate::ItemInput;

/// A mutation that can be driven through a [`Dialog`]
pub trait Mutation {
    /// What the operator fills in
    type Input;
    /// Validated change awaiting confirmation
    type Plan;
    /// Result of applying the plan
    type Outcome;

    fn prepare(&self, input: Self::Input) -> Result<Self::Plan, OpError>;

    fn apply(&self, plan: &Self::Plan, items: &mut Vec<LineItem>) -> Self::Outcome;
}

/// Current state of a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState<P, O> {
    Open,
    Confirming(P),
    Applied(O),
    Cancelled,
}

impl<P, O> DialogState<P, O> {
    fn name(&self) -> &'static str {
        match self {
            DialogState::Open => "open",
            DialogState::Confirming(_) => "awaiting confirmation",
            DialogState::Applied(_) => "applied",
            DialogState::Cancelled => "cancelled",
        }
    }
}

/// A form session for one mutation
pub struct Dialog<M: Mutation> {
    mutation: M,
    state: DialogState<M::Plan, M::Outcome>,
}

impl<M: Mutation> Dialog<M> {
    pub fn new(mutation: M) -> Self {
        Self {
            mutation,
            state: DialogState::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, DialogState::Open)
    }

    /// Validate the input. On failure the form stays open.
    pub fn submit(&mut self, input: M::Input) -> Result<&M::Plan, OpError> {
        if !self.is_open() {
            return Err(self.invalid("submit"));
        }
        let plan = self.mutation.prepare(input)?;
        self.state = DialogState::Confirming(plan);
        match &self.state {
            DialogState::Confirming(plan) => Ok(plan),
            _ => Err(self.invalid("submit")),
        }
    }

    /// Decline the confirmation and return to the form
    pub fn reject(&mut self) -> Result<(), OpError> {
        match self.state {
            DialogState::Confirming(_) => {
                self.state = DialogState::Open;
                Ok(())
            }
            _ => Err(self.invalid("reject")),
        }
    }

    /// Apply the confirmed plan to `items`
    pub fn accept(&mut self, items: &mut Vec<LineItem>) -> Result<&M::Outcome, OpError> {
        let plan = match std::mem::replace(&mut self.state, DialogState::Open) {
            DialogState::Confirming(plan) => plan,
            other => {
                self.state = other;
                return Err(self.invalid("accept"));
            }
        };
        let outcome = self.mutation.apply(&plan, items);
        self.state = DialogState::Applied(outcome);
        match &self.state {
            DialogState::Applied(outcome) => Ok(outcome),
            _ => Err(self.invalid("accept")),
        }
    }

    /// Close without changing anything
    pub fn cancel(&mut self) -> Result<(), OpError> {
        match self.state {
            DialogState::Open | DialogState::Confirming(_) => {
                self.state = DialogState::Cancelled;
                Ok(())
            }
            _ => Err(self.invalid("cancel")),
        }
    }

    /// The outcome, if the dialog was applied
    pub fn into_outcome(self) -> Option<M::Outcome> {
        match self.state {
            DialogState::Applied(outcome) => Some(outcome),
            _ => None,
        }
    }

    fn invalid(&self, action: &'static str) -> OpError {
        OpError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }
}

// ============================================================================
// Mutations
// ============================================================================

/// Add one line item
pub struct AddItem<'a> {
    pub schema: &'a CategorySchema,
}

impl Mutation for AddItem<'_> {
    type Input = ItemInput;
    type Plan = LineItem;
    type Outcome = AddOutcome;

    fn prepare(&self, input: ItemInput) -> Result<LineItem, OpError> {
        Ok(input.validate(self.schema)?)
    }

    fn apply(&self, plan: &LineItem, items: &mut Vec<LineItem>) -> AddOutcome {
        add_item(items, plan.clone(), self.schema.merge_on_add)
    }
}

/// Edit the members of one group
pub struct EditGroup<'a> {
    pub schema: &'a CategorySchema,
    pub members: Vec<LineItem>,
}

impl Mutation for EditGroup<'_> {
    type Input = Vec<ItemInput>;
    type Plan = EditPlan;
    type Outcome = usize;

    fn prepare(&self, input: Vec<ItemInput>) -> Result<EditPlan, OpError> {
        EditPlan::build(self.schema, &self.members, &input)
    }

    fn apply(&self, plan: &EditPlan, items: &mut Vec<LineItem>) -> usize {
        apply_edit(items, plan)
    }
}

/// Take quantity from the members of one group
pub struct RemoveFromGroup {
    pub members: Vec<LineItem>,
}

impl Mutation for RemoveFromGroup {
    type Input = Vec<u32>;
    type Plan = RemovalPlan;
    type Outcome = RemovalOutcome;

    fn prepare(&self, input: Vec<u32>) -> Result<RemovalPlan, OpError> {
        RemovalPlan::build(&self.members, &input)
    }

    fn apply(&self, plan: &RemovalPlan, items: &mut Vec<LineItem>) -> RemovalOutcome {
        apply_removal(items, plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::Category;
    use crate::core::validate::ValidationError;

    fn stock() -> Vec<LineItem> {
        vec![
            LineItem::new(vec!["Nobel".into(), "NP".into()], "N1", "L1", "2027-01-01", 3),
            LineItem::new(vec!["Nobel".into(), "NP".into()], "N2", "L2", "2027-06-01", 1),
        ]
    }

    fn input(schema: &CategorySchema, qty: &str) -> ItemInput {
        let mut input = ItemInput::blank(schema);
        for (field, value) in [
            ("brand", "Nobel"),
            ("platform", "NP"),
            ("ref", "N1"),
            ("lot", "L1"),
            ("expiry", "2027-01-01"),
            ("qty", qty),
        ] {
            input.set(schema, field, value);
        }
        input
    }

    #[test]
    fn test_invalid_submit_stays_open() {
        let schema = Category::CoverScrews.schema();
        let mut dialog = Dialog::new(AddItem { schema: &schema });

        let err = dialog.submit(input(&schema, "lots")).unwrap_err();
        assert_eq!(
            err,
            OpError::Validation(ValidationError::BadQuantity("lots".into()))
        );
        assert!(dialog.is_open());
    }

    #[test]
    fn test_reject_returns_to_open_without_mutation() {
        let schema = Category::CoverScrews.schema();
        let mut items = stock();
        let mut dialog = Dialog::new(AddItem { schema: &schema });

        dialog.submit(input(&schema, "2")).unwrap();
        dialog.reject().unwrap();
        assert!(dialog.is_open());
        assert_eq!(items, stock());

        dialog.submit(input(&schema, "2")).unwrap();
        let outcome = *dialog.accept(&mut items).unwrap();
        assert_eq!(outcome, AddOutcome::Appended);
        assert_eq!(items.len(), 3);
        assert_eq!(dialog.into_outcome(), Some(AddOutcome::Appended));
    }

    #[test]
    fn test_cancel_and_closed_transitions() {
        let schema = Category::CoverScrews.schema();
        let mut items = stock();
        let mut dialog = Dialog::new(AddItem { schema: &schema });

        assert!(dialog.accept(&mut items).is_err(), "nothing to accept yet");
        dialog.cancel().unwrap();
        assert_eq!(&dialog.state, &DialogState::Cancelled);
        assert!(matches!(
            dialog.submit(input(&schema, "1")),
            Err(OpError::InvalidTransition { action: "submit", .. })
        ));
        assert_eq!(items, stock());
    }

    #[test]
    fn test_remove_dialog_requires_nonzero() {
        let mut items = stock();
        let mut dialog = Dialog::new(RemoveFromGroup { members: stock() });

        assert_eq!(
            dialog.submit(vec![0, 0]).unwrap_err(),
            OpError::NothingToRemove
        );
        assert!(dialog.is_open());

        dialog.submit(vec![0, 1]).unwrap();
        let outcome = *dialog.accept(&mut items).unwrap();
        assert_eq!(outcome.deleted, 1);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_edit_dialog_counts_applied() {
        let schema = Category::CoverScrews.schema();
        let mut items = stock();
        let mut dialog = Dialog::new(EditGroup {
            schema: &schema,
            members: stock(),
        });

        let mut inputs: Vec<ItemInput> = stock().iter().map(ItemInput::from_item).collect();
        inputs[0].qty = "9".into();
        let plan = dialog.submit(inputs).unwrap();
        assert_eq!(plan.changes.len(), 1);

        assert_eq!(*dialog.accept(&mut items).unwrap(), 1);
        assert_eq!(items[0].qty, 9);
    }
}
