use crate::{
    engine::{SimEngine, Withdrawal},
    error::SimResult,
    review::{AnnualDecision, DecisionOutcome},
    types::Money,
};
use serde::{Deserialize, Serialize};

/// All collaborator-issued commands.
/// Variants may be added — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Clock control ─────────────────────────────
    Advance { months: u64 },
    Pause,
    Resume,
    Reset,

    // ── Annual review ─────────────────────────────
    ApplyAnnualDecision {
        #[serde(flatten)]
        decision: AnnualDecision,
    },
    SkipAnnualDecision,

    // ── Money and parameters ──────────────────────
    Withdraw { amount: Money },
    SetMonthlySalary { value: Money },
    SetMonthlyBasicExpense { value: Money },
    SetMonthlyInvestTarget { value: Money },
}

/// What a successfully executed command did.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Advanced { months: u64 },
    Withdrew(Withdrawal),
    DecisionApplied(DecisionOutcome),
    Done,
}

impl SimEngine {
    /// Dispatch one command to the matching engine operation.
    pub fn execute(&mut self, command: PlayerCommand) -> SimResult<CommandOutcome> {
        log::debug!("executing {command:?}");
        let outcome = match command {
            PlayerCommand::Advance { months } => {
                CommandOutcome::Advanced { months: self.run_months(months)? }
            }
            PlayerCommand::Pause => {
                self.pause()?;
                CommandOutcome::Done
            }
            PlayerCommand::Resume => {
                self.resume()?;
                CommandOutcome::Done
            }
            PlayerCommand::Reset => {
                self.reset();
                CommandOutcome::Done
            }
            PlayerCommand::ApplyAnnualDecision { decision } => {
                CommandOutcome::DecisionApplied(self.apply_annual_decision(decision)?)
            }
            PlayerCommand::SkipAnnualDecision => {
                self.skip_annual_decision()?;
                CommandOutcome::Done
            }
            PlayerCommand::Withdraw { amount } => CommandOutcome::Withdrew(self.withdraw(amount)?),
            PlayerCommand::SetMonthlySalary { value } => {
                self.set_monthly_salary(value)?;
                CommandOutcome::Done
            }
            PlayerCommand::SetMonthlyBasicExpense { value } => {
                self.set_monthly_basic_expense(value)?;
                CommandOutcome::Done
            }
            PlayerCommand::SetMonthlyInvestTarget { value } => {
                self.set_monthly_invest_target(value)?;
                CommandOutcome::Done
            }
        };
        Ok(outcome)
    }
}
