use solana_program::{
    clock::Clock, entrypoint::ProgramResult, msg, program_error::PrintProgramError,
    pubkey::Pubkey,
};

use crate::{
    collaborators::{BaseAsset, FeeSink, PriceOracle, ReceiptToken, StableUnit},
    engine::VaultEngine,
    error::{VaultError, VaultResult},
    instructions::VaultInstruction,
};

/// Decode `instruction_data` and run it against `engine` on behalf of `signer`
pub fn process_instruction<R, S, B, O, F>(
    engine: &mut VaultEngine<R, S, B, O, F>,
    signer: &Pubkey,
    clock: &Clock,
    instruction_data: &[u8],
) -> ProgramResult
where
    R: ReceiptToken,
    S: StableUnit,
    B: BaseAsset,
    O: PriceOracle,
    F: FeeSink,
{
    let result = dispatch(engine, signer, clock, instruction_data);
    if let Err(error) = result {
        error.print::<VaultError>();
    }
    result.map_err(Into::into)
}

fn dispatch<R, S, B, O, F>(
    engine: &mut VaultEngine<R, S, B, O, F>,
    signer: &Pubkey,
    clock: &Clock,
    instruction_data: &[u8],
) -> VaultResult<()>
where
    R: ReceiptToken,
    S: StableUnit,
    B: BaseAsset,
    O: PriceOracle,
    F: FeeSink,
{
    let instruction = VaultInstruction::unpack(instruction_data)?;
    msg!("Instruction: {}", instruction.name());

    match instruction {
        VaultInstruction::Deposit { amount } => {
            let minted = engine.deposit(signer, amount)?;
            msg!("Minted {} receipt units", minted);
        }

        VaultInstruction::Collateralize { amount } => {
            engine.collateralize(signer, amount, clock)?;
        }

        VaultInstruction::Borrow { amount } => {
            let received = engine.borrow(signer, amount, clock)?;
            msg!("Received {} stable units", received);
        }

        VaultInstruction::Repay { amount } => {
            let outcome = engine.repay(signer, amount, clock)?;
            msg!("Burned {} stable units", outcome.burned);
        }

        VaultInstruction::Liquidate {
            borrower,
            debt_to_repay,
        } => {
            let outcome = engine.liquidate(signer, &borrower, debt_to_repay, clock)?;
            msg!("Liquidator received {} receipt units", outcome.to_liquidator);
        }

        VaultInstruction::Withdraw { amount } => {
            let withdrawn = engine.withdraw(signer, amount, clock)?;
            msg!("Withdrew {} receipt units", withdrawn);
        }

        VaultInstruction::TriggerRebase => {
            if engine.trigger_rebase(clock)?.is_none() {
                msg!("No pending interest to rebase");
            }
        }

        VaultInstruction::UpdateParameter { update } => {
            engine.update_parameter(signer, update, clock)?;
        }
    }

    Ok(())
}
