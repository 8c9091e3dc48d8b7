//! The wallet: mock payment cards held by the user, newest first.

use crate::error::PaymentError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Identifier of a card within one ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A card balance.
///
/// Parsed from display strings such as `"2,500,000"` by stripping the
/// thousands separators, and rendered back the same way.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Balance(pub Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Adds `rhs`, clamping to the representable range instead of panicking.
    pub fn saturating_add(self, rhs: Self) -> Self {
        match self.0.checked_add(rhs.0) {
            Some(sum) => Self(sum),
            None if rhs.0.is_sign_negative() => Self(Decimal::MIN),
            None => Self(Decimal::MAX),
        }
    }
}

impl FromStr for Balance {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
        Decimal::from_str(&cleaned)
            .map(Self)
            .map_err(|_| PaymentError::ValidationError(format!("invalid balance '{s}'")))
    }
}

impl TryFrom<String> for Balance {
    type Error = PaymentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.0.normalize().to_string();
        let (sign, unsigned) = match raw.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", raw.as_str()),
        };
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (unsigned, None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        match frac_part {
            Some(frac) => write!(f, "{sign}{grouped}.{frac}"),
            None => write!(f, "{sign}{grouped}"),
        }
    }
}

impl From<Balance> for String {
    fn from(balance: Balance) -> Self {
        balance.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Credit,
    Debit,
    Prepaid,
}

/// Input for [`WalletLedger::add_card`]; the ledger assigns the id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewWalletCard {
    pub name: String,
    pub balance: Balance,
    pub currency: String,
    pub card_type: CardType,
    pub last_used: NaiveDate,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletCardRecord {
    pub id: CardId,
    pub name: String,
    pub balance: Balance,
    pub currency: String,
    pub card_type: CardType,
    pub last_used: NaiveDate,
    pub is_active: bool,
}

impl WalletCardRecord {
    fn from_new(id: CardId, card: NewWalletCard) -> Self {
        Self {
            id,
            name: card.name,
            balance: card.balance,
            currency: card.currency,
            card_type: card.card_type,
            last_used: card.last_used,
            is_active: card.is_active,
        }
    }
}

/// In-memory card collection owned by one wallet session.
#[derive(Debug, Clone, Default)]
pub struct WalletLedger {
    cards: VecDeque<WalletCardRecord>,
    next_id: u64,
}

impl WalletLedger {
    pub fn new() -> Self {
        Self {
            cards: VecDeque::new(),
            next_id: 1,
        }
    }

    /// Builds a ledger holding `cards` in the given order.
    pub fn seeded(cards: impl IntoIterator<Item = NewWalletCard>) -> Self {
        let mut ledger = Self::new();
        for card in cards {
            let id = ledger.allocate_id();
            ledger.cards.push_back(WalletCardRecord::from_new(id, card));
        }
        ledger
    }

    /// The three cards the demo wallet starts with.
    pub fn demo() -> Self {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        Self::seeded([
            NewWalletCard {
                name: "BCA Debit Card".to_string(),
                balance: Balance(dec!(2500000)),
                currency: "IDR".to_string(),
                card_type: CardType::Debit,
                last_used: date(2024, 1, 15),
                is_active: true,
            },
            NewWalletCard {
                name: "Mandiri Credit Card".to_string(),
                balance: Balance(dec!(5000000)),
                currency: "IDR".to_string(),
                card_type: CardType::Credit,
                last_used: date(2024, 1, 10),
                is_active: false,
            },
            NewWalletCard {
                name: "GoPay Prepaid".to_string(),
                balance: Balance(dec!(150000)),
                currency: "IDR".to_string(),
                card_type: CardType::Prepaid,
                last_used: date(2024, 1, 12),
                is_active: true,
            },
        ])
    }

    fn allocate_id(&mut self) -> CardId {
        let id = CardId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        id
    }

    /// Adds a card at the front of the wallet and returns the stored record.
    pub fn add_card(&mut self, card: NewWalletCard) -> WalletCardRecord {
        let id = self.allocate_id();
        let record = WalletCardRecord::from_new(id, card);
        self.cards.push_front(record.clone());
        record
    }

    /// Removes the card with `id`, if present.
    pub fn remove_card(&mut self, id: CardId) -> Option<WalletCardRecord> {
        let index = self.cards.iter().position(|c| c.id == id)?;
        self.cards.remove(index)
    }

    /// Flips `is_active` and returns the new value, or `None` if absent.
    pub fn toggle_active(&mut self, id: CardId) -> Option<bool> {
        let card = self.get_mut(id)?;
        card.is_active = !card.is_active;
        Some(card.is_active)
    }

    pub fn update_balance(&mut self, id: CardId, balance: Balance) -> bool {
        self.get_mut(id).map(|card| card.balance = balance).is_some()
    }

    pub fn mark_used(&mut self, id: CardId, date: NaiveDate) -> bool {
        self.get_mut(id).map(|card| card.last_used = date).is_some()
    }

    pub fn get(&self, id: CardId) -> Option<&WalletCardRecord> {
        self.cards.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: CardId) -> Option<&mut WalletCardRecord> {
        self.cards.iter_mut().find(|c| c.id == id)
    }

    pub fn cards(&self) -> impl Iterator<Item = &WalletCardRecord> {
        self.cards.iter()
    }

    pub fn active_cards(&self) -> impl Iterator<Item = &WalletCardRecord> {
        self.cards.iter().filter(|c| c.is_active)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Sum of balances over active cards, recomputed on every call.
    ///
    /// Saturates at `Decimal::MAX` / `Decimal::MIN` when the sum does not fit.
    pub fn total_active_balance(&self) -> Decimal {
        self.active_cards()
            .fold(Balance::ZERO, |total, card| total.saturating_add(card.balance))
            .value()
    }
}
