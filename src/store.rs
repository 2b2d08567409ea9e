use std::collections::HashMap;
use std::env;
use std::sync::atomic::{AtomicI32, Ordering};

use chrono::{Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::one::RefMut;

use crate::model;

const DEFAULT_COMPONENTS: [&str; 7] = [
    "EXTERIOR_FRONT",
    "EXTERIOR_REAR",
    "EXTERIOR_LEFT",
    "EXTERIOR_RIGHT",
    "INTERIOR_FRONT",
    "INTERIOR_REAR",
    "DASHBOARD",
];

/// Runtime configuration. The required-component sets come from the fleet
/// configuration service; here they are read from the environment with the
/// standard seven-angle walkaround as the compiled default.
#[derive(Debug, Clone)]
pub struct Config {
    pub otp_ttl: Duration,
    pub required_components: HashMap<model::ImageType, Vec<String>>,
    pub image_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        let walkaround: Vec<String> = DEFAULT_COMPONENTS
            .iter()
            .map(|component| component.to_string())
            .collect();
        let mut required_components = HashMap::new();
        required_components.insert(model::ImageType::BeforeRental, walkaround.clone());
        required_components.insert(model::ImageType::AfterRental, walkaround);
        // Damage documentation is ad hoc; nothing is required up front.
        required_components.insert(model::ImageType::Damage, Vec::new());
        Config {
            otp_ttl: Duration::seconds(300),
            required_components,
            image_base_url: String::from("https://cdn.fleetdesk.rent/booking-images"),
        }
    }
}

impl Config {
    pub fn from_env() -> Config {
        let mut config = Config::default();
        if let Ok(ttl) = env::var("OTP_TTL_SECONDS") {
            if let Ok(seconds) = ttl.parse::<i64>() {
                config.otp_ttl = Duration::seconds(seconds);
            }
        }
        for (key, phase) in [
            ("CHECKLIST_BEFORE_RENTAL", model::ImageType::BeforeRental),
            ("CHECKLIST_AFTER_RENTAL", model::ImageType::AfterRental),
            ("CHECKLIST_DAMAGE", model::ImageType::Damage),
        ] {
            if let Ok(csv) = env::var(key) {
                let components: Vec<String> = csv
                    .split(',')
                    .map(|component| component.trim().to_string())
                    .filter(|component| !component.is_empty())
                    .collect();
                config.required_components.insert(phase, components);
            }
        }
        if let Ok(base_url) = env::var("IMAGE_BASE_URL") {
            config.image_base_url = base_url;
        }
        config
    }

    pub fn required_for(&self, phase: model::ImageType) -> &[String] {
        self.required_components
            .get(&phase)
            .map(|components| components.as_slice())
            .unwrap_or(&[])
    }
}

/// Aggregate store. Each map is keyed by the aggregate id; `get_mut` holds
/// the entry for the duration of a read-guard-evaluate-write sequence, which
/// is the per-aggregate exclusivity the lifecycle methods rely on. Lock order
/// is always booking before invoice/contract reads, and contract before
/// challenge, so the maps cannot deadlock against each other.
pub struct Store {
    pub(crate) bookings: DashMap<i32, model::Booking>,
    pub(crate) contracts: DashMap<i32, model::Contract>,
    pub(crate) challenges: DashMap<(i32, model::SignerRole), model::OtpChallenge>,
    pub(crate) images: DashMap<i32, Vec<model::BookingImage>>,
    pub(crate) invoices: DashMap<i32, model::Invoice>,
    next_id: AtomicI32,
    pub config: Config,
}

impl Store {
    pub fn new(config: Config) -> Store {
        Store {
            bookings: DashMap::new(),
            contracts: DashMap::new(),
            challenges: DashMap::new(),
            images: DashMap::new(),
            invoices: DashMap::new(),
            next_id: AtomicI32::new(1),
            config,
        }
    }

    pub fn from_env() -> Store {
        Store::new(Config::from_env())
    }

    pub fn allocate_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn insert_booking(&self, new_booking: model::NewBooking) -> model::Booking {
        let now = Utc::now();
        let booking = model::Booking {
            id: self.allocate_id(),
            renter_id: new_booking.renter_id,
            vehicle_id: new_booking.vehicle_id,
            staff_id: None,
            rsvp_pickup_time: new_booking.rsvp_pickup_time,
            rsvp_drop_off_time: new_booking.rsvp_drop_off_time,
            actual_return_time: None,
            hourly_rate: new_booking.hourly_rate,
            daily_rate: new_booking.daily_rate,
            total_price: new_booking.total_price,
            deposit_amount: new_booking.deposit_amount,
            status: model::BookingStatus::Reserved,
            deposit_status: model::DepositStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.bookings.insert(booking.id, booking.clone());
        booking
    }

    pub fn booking(&self, booking_id: i32) -> Option<model::Booking> {
        self.bookings
            .get(&booking_id)
            .map(|booking| booking.clone())
    }

    /// Exclusive handle on one booking for a guard-and-write sequence.
    pub fn booking_entry(&self, booking_id: i32) -> Option<RefMut<'_, i32, model::Booking>> {
        self.bookings.get_mut(&booking_id)
    }

    pub fn contract_entry(&self, contract_id: i32) -> Option<RefMut<'_, i32, model::Contract>> {
        self.contracts.get_mut(&contract_id)
    }

    pub fn insert_contract(&self, contract: model::Contract) {
        self.contracts.insert(contract.id, contract);
    }

    /// The at-most-one non-cancelled contract of a booking.
    pub fn active_contract_for_booking(&self, booking_id: i32) -> Option<model::Contract> {
        self.contracts
            .iter()
            .find(|contract| {
                contract.booking_id == booking_id
                    && contract.status != model::ContractStatus::Cancelled
            })
            .map(|contract| contract.clone())
    }

    pub fn invoice_entry(&self, invoice_id: i32) -> Option<RefMut<'_, i32, model::Invoice>> {
        self.invoices.get_mut(&invoice_id)
    }

    pub fn insert_invoice(&self, invoice: model::Invoice) {
        self.invoices.insert(invoice.id, invoice);
    }

    pub fn final_invoice_for_booking(&self, booking_id: i32) -> Option<model::Invoice> {
        self.invoices
            .iter()
            .find(|invoice| {
                invoice.booking_id == booking_id
                    && invoice.invoice_type == model::InvoiceType::Final
                    && invoice.status != model::InvoiceStatus::Cancelled
            })
            .map(|invoice| invoice.clone())
    }

    pub fn invoices_for_booking(&self, booking_id: i32) -> Vec<model::Invoice> {
        self.invoices
            .iter()
            .filter(|invoice| invoice.booking_id == booking_id)
            .map(|invoice| invoice.clone())
            .collect()
    }

    pub fn images_for_booking(&self, booking_id: i32) -> Vec<model::BookingImage> {
        self.images
            .get(&booking_id)
            .map(|images| images.clone())
            .unwrap_or_default()
    }

    pub fn images_for_phase(
        &self,
        booking_id: i32,
        phase: model::ImageType,
    ) -> Vec<model::BookingImage> {
        self.images
            .get(&booking_id)
            .map(|images| {
                images
                    .iter()
                    .filter(|image| image.image_type == phase)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
