use chrono::Utc;
use rust_decimal::Decimal;

use crate::helper_model::FleetdeskError;
use crate::model;
use crate::store::Store;

/// Opens the final invoice for an in-progress booking. The invoice starts
/// with a single base-rental line carrying the booking's price snapshot, so
/// the total stays a plain sum over the detail rows as spare-part lines are
/// added.
pub fn open_final_invoice(
    store: &Store,
    booking_id: i32,
) -> Result<model::Invoice, FleetdeskError> {
    let booking = store
        .booking_entry(booking_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "booking",
            id: booking_id,
        })?;

    if booking.status != model::BookingStatus::InProgress {
        return Err(FleetdeskError::InvalidState(format!(
            "Booking {} is {:?}; settlement opens once the rental is in progress. ",
            booking_id, booking.status
        )));
    }
    if let Some(existing) = store.final_invoice_for_booking(booking_id) {
        return Err(FleetdeskError::InvalidState(format!(
            "Final invoice {} already exists for booking {}. ",
            existing.id, booking_id
        )));
    }

    let base_line = model::InvoiceDetail {
        id: store.allocate_id(),
        item_name: String::from("Base rental charge"),
        quantity: 1,
        unit_price: booking.total_price,
        line_total: booking.total_price,
    };
    let mut invoice = model::Invoice {
        id: store.allocate_id(),
        booking_id,
        invoice_type: model::InvoiceType::Final,
        details: vec![base_line],
        deposit_amount: booking.deposit_amount,
        total_amount: Decimal::ZERO,
        refund_amount: Decimal::ZERO,
        status: model::InvoiceStatus::Unpaid,
        payment_method: None,
        notes: None,
        created_at: Utc::now(),
        completed_at: None,
    };
    invoice.recompute_totals();
    store.insert_invoice(invoice.clone());
    tracing::info!(invoice_id = invoice.id, booking_id, "final invoice opened");
    Ok(invoice)
}

pub fn add_line_item(
    store: &Store,
    invoice_id: i32,
    item_name: String,
    quantity: i32,
    unit_price: Decimal,
) -> Result<model::Invoice, FleetdeskError> {
    let mut invoice = store
        .invoice_entry(invoice_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "invoice",
            id: invoice_id,
        })?;

    if invoice.invoice_type != model::InvoiceType::Final {
        return Err(FleetdeskError::InvalidState(String::from(
            "Line items only apply to the final invoice. ",
        )));
    }
    if invoice.status != model::InvoiceStatus::Unpaid {
        return Err(FleetdeskError::InvalidState(format!(
            "Invoice {} is {:?}; line items are frozen. ",
            invoice_id, invoice.status
        )));
    }
    if quantity <= 0 || unit_price < Decimal::ZERO {
        return Err(FleetdeskError::PreconditionFailed(vec![String::from(
            "a line item needs a positive quantity and a non-negative unit price",
        )]));
    }

    let line_total = unit_price * Decimal::from(quantity);
    invoice.details.push(model::InvoiceDetail {
        id: store.allocate_id(),
        item_name,
        quantity,
        unit_price,
        line_total,
    });
    invoice.recompute_totals();
    Ok(invoice.clone())
}

pub fn remove_line_item(
    store: &Store,
    invoice_id: i32,
    detail_id: i32,
) -> Result<model::Invoice, FleetdeskError> {
    let mut invoice = store
        .invoice_entry(invoice_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "invoice",
            id: invoice_id,
        })?;

    if invoice.status != model::InvoiceStatus::Unpaid {
        return Err(FleetdeskError::InvalidState(format!(
            "Invoice {} is {:?}; line items are frozen. ",
            invoice_id, invoice.status
        )));
    }
    let position = invoice
        .details
        .iter()
        .position(|detail| detail.id == detail_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "invoice detail",
            id: detail_id,
        })?;

    invoice.details.remove(position);
    invoice.recompute_totals();
    Ok(invoice.clone())
}

/// All-or-nothing cash settlement: the paid amount must equal the
/// outstanding balance exactly, and there must be one. A second payment
/// against a settled invoice is an explicit error, never a silent no-op.
pub fn apply_cash_payment(
    store: &Store,
    invoice_id: i32,
    amount: Decimal,
) -> Result<model::Invoice, FleetdeskError> {
    let mut invoice = store
        .invoice_entry(invoice_id)
        .ok_or(FleetdeskError::NotFound {
            entity: "invoice",
            id: invoice_id,
        })?;

    if invoice.is_settled() {
        return Err(FleetdeskError::InvalidState(format!(
            "Invoice {} is already {:?}. ",
            invoice_id, invoice.status
        )));
    }
    let outstanding = invoice.outstanding();
    if outstanding == Decimal::ZERO || amount != outstanding {
        return Err(FleetdeskError::AmountMismatch {
            expected: outstanding,
        });
    }

    invoice.status = model::InvoiceStatus::Paid;
    invoice.payment_method = Some(model::PaymentMethodKind::Cash);
    invoice.completed_at = Some(Utc::now());
    tracing::info!(invoice_id, %amount, "cash payment applied");
    Ok(invoice.clone())
}

/// Refund settlement for invoices where the held deposit covers the total.
/// The reason is mandatory for the audit trail. On success the booking's
/// deposit is marked refunded.
pub fn apply_refund(
    store: &Store,
    invoice_id: i32,
    method: model::PaymentMethodKind,
    reason: &str,
) -> Result<model::Invoice, FleetdeskError> {
    let settled = {
        let mut invoice = store
            .invoice_entry(invoice_id)
            .ok_or(FleetdeskError::NotFound {
                entity: "invoice",
                id: invoice_id,
            })?;

        if invoice.is_settled() {
            return Err(FleetdeskError::RefundAlreadyIssued);
        }
        if reason.trim().is_empty() {
            return Err(FleetdeskError::PreconditionFailed(vec![String::from(
                "a refund reason is required for the audit trail",
            )]));
        }
        let outstanding = invoice.outstanding();
        if outstanding > Decimal::ZERO {
            return Err(FleetdeskError::PreconditionFailed(vec![format!(
                "the renter still owes {}; collect the payment instead of refunding",
                outstanding
            )]));
        }

        invoice.status = model::InvoiceStatus::Paid;
        invoice.payment_method = Some(method);
        invoice.notes = Some(reason.trim().to_string());
        invoice.completed_at = Some(Utc::now());
        invoice.clone()
        // The invoice entry drops here; the booking entry is taken next, so
        // the two locks are never held together.
    };

    if settled.refund_amount > Decimal::ZERO {
        if let Some(mut booking) = store.booking_entry(settled.booking_id) {
            booking.deposit_status = model::DepositStatus::Refunded;
            booking.updated_at = Utc::now();
        }
    }
    tracing::info!(
        invoice_id,
        refund = %settled.refund_amount,
        "refund settlement applied"
    );
    Ok(settled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper_model::{Actor, ActorRole};
    use crate::methods::{checklist, lifecycle};
    use crate::store::Config;
    use chrono::Duration;
    use proptest::prelude::*;

    fn in_progress_booking(store: &Store) -> model::Booking {
        let booking = store.insert_booking(model::NewBooking {
            renter_id: 42,
            vehicle_id: 9,
            rsvp_pickup_time: Utc::now(),
            rsvp_drop_off_time: Utc::now() + Duration::hours(12),
            hourly_rate: Decimal::from(25_000),
            daily_rate: Decimal::from(400_000),
            total_price: Decimal::from(300_000),
            deposit_amount: Decimal::from(2_000_000),
        });
        lifecycle::record_deposit_status(store, booking.id, model::DepositStatus::Paid).unwrap();
        lifecycle::approve_booking(store, booking.id).unwrap();
        for component in store
            .config
            .required_for(model::ImageType::BeforeRental)
            .to_vec()
        {
            checklist::capture_image(
                store,
                booking.id,
                model::ImageType::BeforeRental,
                component.clone(),
                String::from("walkaround shot"),
                format!("https://cdn.test/{component}.jpg"),
            )
            .unwrap();
        }
        let staff = Actor {
            id: 77,
            role: ActorRole::Staff,
        };
        lifecycle::confirm_check_in(store, &staff, booking.id).unwrap()
    }

    #[test]
    fn final_invoice_opens_with_the_price_snapshot() {
        let store = Store::new(Config::default());
        let booking = in_progress_booking(&store);

        let invoice = open_final_invoice(&store, booking.id).unwrap();
        assert_eq!(invoice.total_amount, Decimal::from(300_000));
        assert_eq!(invoice.deposit_amount, Decimal::from(2_000_000));
        assert_eq!(invoice.refund_amount, Decimal::from(1_700_000));
        assert_eq!(invoice.outstanding(), Decimal::ZERO);
        assert_eq!(invoice.status, model::InvoiceStatus::Unpaid);

        // One final invoice per booking.
        assert!(matches!(
            open_final_invoice(&store, booking.id),
            Err(FleetdeskError::InvalidState(_))
        ));
    }

    #[test]
    fn settlement_closes_by_refund_when_deposit_covers_total() {
        // Deposit 2,000,000; base rental 300,000 plus one 1,500,000 spare
        // part leaves 200,000 to hand back.
        let store = Store::new(Config::default());
        let booking = in_progress_booking(&store);
        let invoice = open_final_invoice(&store, booking.id).unwrap();

        let invoice = add_line_item(
            &store,
            invoice.id,
            String::from("Windshield replacement"),
            1,
            Decimal::from(1_500_000),
        )
        .unwrap();
        assert_eq!(invoice.total_amount, Decimal::from(1_800_000));
        assert_eq!(invoice.refund_amount, Decimal::from(200_000));
        assert_eq!(invoice.outstanding(), Decimal::ZERO);

        // Nothing is outstanding, so a cash payment has no amount to match.
        assert!(matches!(
            apply_cash_payment(&store, invoice.id, Decimal::from(200_000)),
            Err(FleetdeskError::AmountMismatch { .. })
        ));

        let settled = apply_refund(
            &store,
            invoice.id,
            model::PaymentMethodKind::BankTransfer,
            "deposit exceeds final total",
        )
        .unwrap();
        assert_eq!(settled.status, model::InvoiceStatus::Paid);
        assert!(settled.completed_at.is_some());
        assert_eq!(
            store.booking(booking.id).unwrap().deposit_status,
            model::DepositStatus::Refunded
        );
    }

    #[test]
    fn settlement_closes_by_exact_cash_payment_when_total_exceeds_deposit() {
        let store = Store::new(Config::default());
        let booking = in_progress_booking(&store);
        let invoice = open_final_invoice(&store, booking.id).unwrap();
        let invoice = add_line_item(
            &store,
            invoice.id,
            String::from("Full respray"),
            1,
            Decimal::from(2_500_000),
        )
        .unwrap();
        assert_eq!(invoice.outstanding(), Decimal::from(800_000));
        assert_eq!(invoice.refund_amount, Decimal::ZERO);

        // Partial and excess payments are both rejected.
        assert!(matches!(
            apply_cash_payment(&store, invoice.id, Decimal::from(500_000)),
            Err(FleetdeskError::AmountMismatch { .. })
        ));
        assert!(matches!(
            apply_refund(
                &store,
                invoice.id,
                model::PaymentMethodKind::Cash,
                "should not refund"
            ),
            Err(FleetdeskError::PreconditionFailed(_))
        ));

        let settled = apply_cash_payment(&store, invoice.id, Decimal::from(800_000)).unwrap();
        assert_eq!(settled.status, model::InvoiceStatus::Paid);
        assert_eq!(settled.payment_method, Some(model::PaymentMethodKind::Cash));

        // Settlement actions move money; repeating them is an error.
        assert!(matches!(
            apply_cash_payment(&store, invoice.id, Decimal::from(800_000)),
            Err(FleetdeskError::InvalidState(_))
        ));
        assert_eq!(
            apply_refund(&store, invoice.id, model::PaymentMethodKind::Cash, "dup"),
            Err(FleetdeskError::RefundAlreadyIssued)
        );
    }

    #[test]
    fn line_items_freeze_once_settled() {
        let store = Store::new(Config::default());
        let booking = in_progress_booking(&store);
        let invoice = open_final_invoice(&store, booking.id).unwrap();
        apply_refund(
            &store,
            invoice.id,
            model::PaymentMethodKind::Cash,
            "no extra charges",
        )
        .unwrap();

        assert!(matches!(
            add_line_item(
                &store,
                invoice.id,
                String::from("Late fee"),
                1,
                Decimal::from(50_000)
            ),
            Err(FleetdeskError::InvalidState(_))
        ));
        let detail_id = invoice.details[0].id;
        assert!(matches!(
            remove_line_item(&store, invoice.id, detail_id),
            Err(FleetdeskError::InvalidState(_))
        ));
    }

    #[test]
    fn removing_a_line_restores_the_totals() {
        let store = Store::new(Config::default());
        let booking = in_progress_booking(&store);
        let invoice = open_final_invoice(&store, booking.id).unwrap();
        let with_part = add_line_item(
            &store,
            invoice.id,
            String::from("Side mirror"),
            2,
            Decimal::from(250_000),
        )
        .unwrap();
        assert_eq!(with_part.total_amount, Decimal::from(800_000));

        let part_detail_id = with_part.details.last().unwrap().id;
        let without_part = remove_line_item(&store, invoice.id, part_detail_id).unwrap();
        assert_eq!(without_part.total_amount, Decimal::from(300_000));
        assert_eq!(without_part.refund_amount, Decimal::from(1_700_000));
    }

    #[test]
    fn refund_requires_a_reason() {
        let store = Store::new(Config::default());
        let booking = in_progress_booking(&store);
        let invoice = open_final_invoice(&store, booking.id).unwrap();

        let result = apply_refund(&store, invoice.id, model::PaymentMethodKind::Cash, "   ");
        assert!(matches!(result, Err(FleetdeskError::PreconditionFailed(_))));
    }

    #[test]
    fn zero_balance_invoice_closes_via_zero_refund() {
        let store = Store::new(Config::default());
        let booking = in_progress_booking(&store);
        let invoice = open_final_invoice(&store, booking.id).unwrap();
        // Push the total to exactly the deposit.
        let invoice = add_line_item(
            &store,
            invoice.id,
            String::from("Engine work"),
            1,
            Decimal::from(1_700_000),
        )
        .unwrap();
        assert_eq!(invoice.outstanding(), Decimal::ZERO);
        assert_eq!(invoice.refund_amount, Decimal::ZERO);

        assert!(matches!(
            apply_cash_payment(&store, invoice.id, Decimal::ZERO),
            Err(FleetdeskError::AmountMismatch { .. })
        ));
        let settled = apply_refund(
            &store,
            invoice.id,
            model::PaymentMethodKind::Cash,
            "deposit matches total exactly",
        )
        .unwrap();
        assert_eq!(settled.status, model::InvoiceStatus::Paid);
        // A zero refund does not move the deposit.
        assert_eq!(
            store.booking(booking.id).unwrap().deposit_status,
            model::DepositStatus::Paid
        );
    }

    proptest! {
        // For any deposit/total pair at most one settlement direction is
        // ever positive, and the two figures always reconcile.
        #[test]
        fn exactly_one_settlement_direction(deposit in 0i64..10_000_000, total in 0i64..10_000_000) {
            let mut invoice = model::Invoice {
                id: 1,
                booking_id: 1,
                invoice_type: model::InvoiceType::Final,
                details: vec![model::InvoiceDetail {
                    id: 2,
                    item_name: String::from("line"),
                    quantity: 1,
                    unit_price: Decimal::from(total),
                    line_total: Decimal::from(total),
                }],
                deposit_amount: Decimal::from(deposit),
                total_amount: Decimal::ZERO,
                refund_amount: Decimal::ZERO,
                status: model::InvoiceStatus::Unpaid,
                payment_method: None,
                notes: None,
                created_at: Utc::now(),
                completed_at: None,
            };
            invoice.recompute_totals();
            let outstanding = invoice.outstanding();
            let refund = invoice.refund_amount;

            prop_assert!(outstanding >= Decimal::ZERO && refund >= Decimal::ZERO);
            prop_assert!(!(outstanding > Decimal::ZERO && refund > Decimal::ZERO));
            prop_assert_eq!(outstanding - refund, Decimal::from(total) - Decimal::from(deposit));
        }
    }
}
