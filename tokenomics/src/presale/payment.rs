use crate::{crypto::Address, error::Result, ledger::{Amount, Ledger}};

/// Fungible asset used to pay for presale purchases
///
/// Only the subset of the asset interface the presale needs: the engine
/// pulls payment with a pre-approved allowance and never looks further.
pub trait PaymentAsset {
    fn balance_of(&self, account: &Address) -> Amount;

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;

    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()>;
}

impl PaymentAsset for Ledger {
    fn balance_of(&self, account: &Address) -> Amount {
        Ledger::balance_of(self, account)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        Ledger::allowance(self, owner, spender)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        Ledger::transfer_from(self, spender, owner, to, amount)
    }
}
