//! In-memory implementation of the storage ports.
//!
//! One `Mutex` guards all tables, so every port call is atomic exactly like
//! its single-statement PostgreSQL counterpart. Used by tests and useful for
//! local wiring without a database.

use crate::domain::foundation::{
    ActivationId, DomainError, ErrorCode, PaymentId, PromoCodeId, UserId,
};
use crate::domain::promo::{
    ActiveDiscount, NewPromoCode, PaymentRecord, PromoCode, PromoCodeActivation, PromoCodeType,
    PromoCodeUpdate,
};
use crate::ports::{
    ActivationLedger, ActivationRecord, ActiveDiscountStore, DiscountGrant, PaymentStore,
    PromoCodeCatalog, UsageIncrement,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

fn page<T>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[derive(Default)]
struct State {
    promos: HashMap<i64, PromoCode>,
    activations: Vec<PromoCodeActivation>,
    discounts: HashMap<i64, ActiveDiscount>,
    payments: HashMap<i64, PaymentRecord>,
    next_promo_id: i64,
    next_activation_id: i64,
}

/// All storage ports backed by one in-process mutex.
#[derive(Default)]
pub struct InMemoryPromoStore {
    state: Mutex<State>,
}

impl InMemoryPromoStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock means a panic mid-write in another test thread;
        // propagating the panic is the only sane reaction.
        self.state.lock().expect("in-memory store lock poisoned")
    }

    /// Seeds a payment row (payments are otherwise owned by the billing
    /// layer, which this store stands in for).
    pub fn insert_payment(&self, payment: PaymentRecord) {
        self.lock().payments.insert(payment.id.value(), payment);
    }

    /// Snapshot of a promo code for assertions.
    pub fn promo_snapshot(&self, id: PromoCodeId) -> Option<PromoCode> {
        self.lock().promos.get(&id.value()).cloned()
    }

    /// Snapshot of a payment row for assertions.
    pub fn payment_snapshot(&self, id: PaymentId) -> Option<PaymentRecord> {
        self.lock().payments.get(&id.value()).cloned()
    }
}

#[async_trait]
impl PromoCodeCatalog for InMemoryPromoStore {
    async fn create(&self, input: NewPromoCode) -> Result<PromoCode, DomainError> {
        let mut state = self.lock();

        // Codes are stored uppercase no matter what the caller passes in.
        let code = input.code.trim().to_uppercase();
        if state.promos.values().any(|p| p.code == code) {
            return Err(DomainError::new(
                ErrorCode::DuplicatePromoCode,
                format!("Promo code '{}' already exists", code),
            )
            .with_detail("code", code.clone()));
        }

        state.next_promo_id += 1;
        let promo = PromoCode {
            id: PromoCodeId::new(state.next_promo_id),
            code,
            promo_type: input.promo_type,
            bonus_days: input.bonus_days,
            discount_percentage: input.discount_percentage,
            max_activations: input.max_activations,
            current_activations: 0,
            is_active: input.is_active,
            valid_until: input.valid_until,
            created_at: Utc::now(),
        };
        state.promos.insert(promo.id.value(), promo.clone());
        Ok(promo)
    }

    async fn find_by_id(&self, id: PromoCodeId) -> Result<Option<PromoCode>, DomainError> {
        Ok(self.lock().promos.get(&id.value()).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<PromoCode>, DomainError> {
        let wanted = code.trim().to_uppercase();
        Ok(self
            .lock()
            .promos
            .values()
            .find(|p| p.code == wanted)
            .cloned())
    }

    async fn find_eligible(
        &self,
        code: &str,
        promo_type: PromoCodeType,
        now: DateTime<Utc>,
    ) -> Result<Option<PromoCode>, DomainError> {
        let wanted = code.trim().to_uppercase();
        Ok(self
            .lock()
            .promos
            .values()
            .find(|p| p.code == wanted && p.promo_type == promo_type && p.is_eligible(now))
            .cloned())
    }

    async fn list_active(&self, limit: i64, offset: i64) -> Result<Vec<PromoCode>, DomainError> {
        let state = self.lock();
        let mut promos: Vec<PromoCode> =
            state.promos.values().filter(|p| p.is_active).cloned().collect();
        promos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.value().cmp(&a.id.value())));
        Ok(page(promos, limit, offset))
    }

    async fn list_all(&self, limit: i64, offset: i64) -> Result<Vec<PromoCode>, DomainError> {
        let state = self.lock();
        let mut promos: Vec<PromoCode> = state.promos.values().cloned().collect();
        promos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.value().cmp(&a.id.value())));
        Ok(page(promos, limit, offset))
    }

    async fn count(&self) -> Result<i64, DomainError> {
        Ok(self.lock().promos.len() as i64)
    }

    async fn update(
        &self,
        id: PromoCodeId,
        update: PromoCodeUpdate,
    ) -> Result<Option<PromoCode>, DomainError> {
        let mut state = self.lock();
        match state.promos.get_mut(&id.value()) {
            Some(promo) => {
                update.apply_to(promo);
                Ok(Some(promo.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: PromoCodeId) -> Result<bool, DomainError> {
        let mut state = self.lock();
        if state.promos.remove(&id.value()).is_none() {
            return Ok(false);
        }
        state
            .discounts
            .retain(|_, d| d.promo_code_id != id);
        for payment in state.payments.values_mut() {
            if payment.promo_code_id == Some(id) {
                payment.promo_code_id = None;
            }
        }
        state.activations.retain(|a| a.promo_code_id != id);
        Ok(true)
    }

    async fn increment_usage(
        &self,
        id: PromoCodeId,
        allow_overflow: bool,
    ) -> Result<UsageIncrement, DomainError> {
        let mut state = self.lock();
        match state.promos.get_mut(&id.value()) {
            Some(promo) => {
                if allow_overflow || promo.has_capacity() {
                    promo.current_activations += 1;
                    Ok(UsageIncrement::Updated)
                } else {
                    Ok(UsageIncrement::CapReached)
                }
            }
            None => Ok(UsageIncrement::NotFound),
        }
    }

    async fn decrement_usage(&self, id: PromoCodeId) -> Result<bool, DomainError> {
        let mut state = self.lock();
        match state.promos.get_mut(&id.value()) {
            Some(promo) if promo.current_activations > 0 => {
                promo.current_activations -= 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl ActivationLedger for InMemoryPromoStore {
    async fn find(
        &self,
        promo_code_id: PromoCodeId,
        user_id: UserId,
    ) -> Result<Option<PromoCodeActivation>, DomainError> {
        Ok(self
            .lock()
            .activations
            .iter()
            .find(|a| a.promo_code_id == promo_code_id && a.user_id == user_id)
            .cloned())
    }

    async fn record(
        &self,
        promo_code_id: PromoCodeId,
        user_id: UserId,
        payment_id: Option<PaymentId>,
    ) -> Result<ActivationRecord, DomainError> {
        let mut state = self.lock();
        if let Some(existing) = state
            .activations
            .iter()
            .find(|a| a.promo_code_id == promo_code_id && a.user_id == user_id)
        {
            return Ok(ActivationRecord::AlreadyRecorded(existing.clone()));
        }

        state.next_activation_id += 1;
        let activation = PromoCodeActivation {
            id: ActivationId::new(state.next_activation_id),
            promo_code_id,
            user_id,
            payment_id,
            activated_at: Utc::now(),
        };
        state.activations.push(activation.clone());
        Ok(ActivationRecord::Recorded(activation))
    }

    async fn attach_payment(
        &self,
        promo_code_id: PromoCodeId,
        user_id: UserId,
        payment_id: PaymentId,
    ) -> Result<bool, DomainError> {
        let mut state = self.lock();
        match state.activations.iter_mut().find(|a| {
            a.promo_code_id == promo_code_id && a.user_id == user_id && a.payment_id.is_none()
        }) {
            Some(activation) => {
                activation.payment_id = Some(payment_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_for_promo(
        &self,
        promo_code_id: PromoCodeId,
    ) -> Result<Vec<PromoCodeActivation>, DomainError> {
        let state = self.lock();
        let mut activations: Vec<PromoCodeActivation> = state
            .activations
            .iter()
            .filter(|a| a.promo_code_id == promo_code_id)
            .cloned()
            .collect();
        activations.sort_by(|a, b| b.activated_at.cmp(&a.activated_at));
        Ok(activations)
    }

    async fn count_for_promo(&self, promo_code_id: PromoCodeId) -> Result<i64, DomainError> {
        Ok(self
            .lock()
            .activations
            .iter()
            .filter(|a| a.promo_code_id == promo_code_id)
            .count() as i64)
    }
}

#[async_trait]
impl ActiveDiscountStore for InMemoryPromoStore {
    async fn get(&self, user_id: UserId) -> Result<Option<ActiveDiscount>, DomainError> {
        Ok(self.lock().discounts.get(&user_id.value()).cloned())
    }

    async fn set(&self, discount: ActiveDiscount) -> Result<DiscountGrant, DomainError> {
        let mut state = self.lock();
        if let Some(existing) = state.discounts.get(&discount.user_id.value()) {
            return Ok(DiscountGrant::AlreadyActive(existing.clone()));
        }
        state
            .discounts
            .insert(discount.user_id.value(), discount.clone());
        Ok(DiscountGrant::Granted(discount))
    }

    async fn clear(&self, user_id: UserId) -> Result<Option<ActiveDiscount>, DomainError> {
        Ok(self.lock().discounts.remove(&user_id.value()))
    }

    async fn clear_by_promo(&self, promo_code_id: PromoCodeId) -> Result<u64, DomainError> {
        let mut state = self.lock();
        let before = state.discounts.len();
        state.discounts.retain(|_, d| d.promo_code_id != promo_code_id);
        Ok((before - state.discounts.len()) as u64)
    }
}

#[async_trait]
impl PaymentStore for InMemoryPromoStore {
    async fn find_by_id(&self, id: PaymentId) -> Result<Option<PaymentRecord>, DomainError> {
        Ok(self.lock().payments.get(&id.value()).cloned())
    }
}
