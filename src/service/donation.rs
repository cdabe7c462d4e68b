//! Giving records

use crate::crypto::generate_reference;
use crate::domain::{
    CreateDonationInput, Donation, DonationStats, DonationStatus, Page, PageRequest, Stored,
    StringUuid,
};
use crate::error::{AppError, Result};
use crate::events::{DomainEvent, EventPublisher};
use crate::repository::{Filter, ScopedRepository, Sort, TenantScope, Update};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

const DEFAULT_CURRENCY: &str = "USD";
const REFERENCE_PREFIX: &str = "DON";

pub struct DonationService<S: ScopedRepository<Donation>> {
    store: Arc<S>,
    events: Arc<dyn EventPublisher>,
}

impl<S: ScopedRepository<Donation>> DonationService<S> {
    pub fn new(store: Arc<S>, events: Arc<dyn EventPublisher>) -> Self {
        Self { store, events }
    }

    pub async fn donate(
        &self,
        scope: &TenantScope,
        input: CreateDonationInput,
        user_id: StringUuid,
    ) -> Result<Stored<Donation>> {
        input.validate()?;
        let donation = Donation {
            user_id,
            amount: input.amount,
            currency: DEFAULT_CURRENCY.to_string(),
            donation_type: input.donation_type,
            payment_method: input.payment_method,
            status: DonationStatus::Pending,
            reference: generate_reference(REFERENCE_PREFIX),
            is_anonymous: input.is_anonymous.unwrap_or(false),
            is_recurring: input.is_recurring.unwrap_or(false),
            recurring_frequency: input.recurring_frequency,
            notes: input.notes,
        };
        let donation = self.store.create(scope, donation).await?;

        self.publish_status(scope, &donation).await;
        info!(
            tenant_id = %scope,
            donation_id = %donation.id,
            reference = %donation.doc.reference,
            "Donation recorded"
        );
        Ok(donation)
    }

    pub async fn mine(
        &self,
        scope: &TenantScope,
        user_id: StringUuid,
        page: PageRequest,
    ) -> Result<Page<Stored<Donation>>> {
        self.store
            .find_page(
                scope,
                Filter::new().eq("userId", user_id),
                Sort::default(),
                page,
            )
            .await
    }

    /// Totals over completed donations only
    pub async fn stats(&self, scope: &TenantScope) -> Result<DonationStats> {
        let completed = self
            .store
            .find(
                scope,
                Filter::new().eq("status", DonationStatus::Completed),
                Sort::default(),
            )
            .await?;
        let amounts: Vec<f64> = completed.iter().map(|d| d.doc.amount).collect();
        Ok(DonationStats::from_amounts(&amounts))
    }

    /// Setting the current status again is a no-op and emits nothing
    pub async fn update_status(
        &self,
        scope: &TenantScope,
        id: StringUuid,
        status: DonationStatus,
    ) -> Result<Stored<Donation>> {
        let donation = self
            .store
            .find_by_id(scope, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Donation not found".to_string()))?;
        if donation.doc.status == status {
            return Ok(donation);
        }

        let donation = self
            .store
            .update(scope, id, Update::new().set("status", status))
            .await?
            .ok_or_else(|| AppError::NotFound("Donation not found".to_string()))?;

        self.publish_status(scope, &donation).await;
        info!(
            tenant_id = %scope,
            donation_id = %id,
            status = status.as_str(),
            "Donation status updated"
        );
        Ok(donation)
    }

    async fn publish_status(&self, scope: &TenantScope, donation: &Stored<Donation>) {
        self.events
            .publish(DomainEvent::DonationStatusUpdated {
                tenant_id: scope.tenant_id(),
                user_id: donation.doc.user_id,
                timestamp: Utc::now(),
                donation_id: donation.id,
                amount: donation.doc.amount,
                status: donation.doc.status,
            })
            .await;
    }
}
