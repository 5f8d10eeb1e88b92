use busline_core::{Booking, BusType};
use chrono::{DateTime, Duration, Utc};
use qrcode::render::svg;
use qrcode::types::QrError;
use qrcode::{Color, QrCode};
use serde::Serialize;
use tracing::warn;

use crate::pdf::{Font, Page, Rgb, PAGE_HEIGHT, PAGE_WIDTH};

pub const DEFAULT_BOARDING_OFFSET_MINUTES: i64 = 30;

/// Printed QR code edge in points, quiet zone included
pub const QR_SIZE: f32 = 120.0;
const QR_QUIET_ZONE: usize = 4;

const TERMS: [&str; 5] = [
    "1. Please carry a valid ID while boarding.",
    "2. Show this ticket to the conductor at the time of boarding.",
    "3. Booking is non-refundable unless canceled by MyBusPortal.",
    "4. MyBusPortal is not responsible for personal belongings.",
    "5. Follow bus staff instructions for a safe journey.",
];

/// A rendered ticket ready to download or attach
#[derive(Debug, Clone)]
pub struct TicketDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl TicketDocument {
    pub const CONTENT_TYPE: &'static str = "application/pdf";
}

/// Everything the ticket shows, derived from a booking
#[derive(Debug, Clone, Serialize)]
pub struct TicketView {
    pub ticket_number: String,
    pub passenger_name: String,
    pub route: String,
    pub route_name: String,
    pub bus_type: BusType,
    pub adults: u32,
    pub children: u32,
    pub total_fare: String,
    pub booked_at: DateTime<Utc>,
    pub boarding_time: DateTime<Utc>,
    pub qr_payload: String,
    /// Scannable QR code for on-screen display, absent if the payload does not fit
    pub qr_svg: Option<String>,
}

impl TicketView {
    pub fn new(booking: &Booking, boarding_offset: Duration) -> Self {
        let boarding_time = boarding_time(booking, boarding_offset);
        let qr_payload = qr_payload(booking, boarding_time);
        let qr_svg = QrCode::new(qr_payload.as_bytes())
            .map(|code| {
                code.render::<svg::Color>()
                    .min_dimensions(QR_SIZE as u32, QR_SIZE as u32)
                    .build()
            })
            .ok();
        Self {
            ticket_number: booking.ticket_number.clone(),
            passenger_name: booking.name.clone(),
            route: booking.route.display_name(),
            route_name: booking.route.name.clone(),
            bus_type: booking.route.bus_type,
            adults: booking.adults,
            children: booking.children,
            total_fare: format!("{:.2}", booking.total_fare),
            booked_at: booking.booked_at,
            boarding_time,
            qr_payload,
            qr_svg,
        }
    }
}

pub fn boarding_time(booking: &Booking, offset: Duration) -> DateTime<Utc> {
    booking.booked_at + offset
}

/// Text encoded into the ticket's QR code
pub fn qr_payload(booking: &Booking, boarding_time: DateTime<Utc>) -> String {
    format!(
        "Ticket:{}|Name:{}|Route:{}|Class:{}|Seats:{}A,{}C|Boarding:{}",
        booking.ticket_number,
        booking.name,
        booking.route.name,
        booking.route.bus_type,
        booking.adults,
        booking.children,
        boarding_time.format("%H:%M %d-%b-%Y")
    )
}

/// Draw the QR code for `payload` as one filled square per dark module,
/// with the bottom-left corner of the quiet zone at (x, y).
pub fn draw_qr(page: &mut Page, payload: &str, x: f32, y: f32) -> Result<(), QrError> {
    let code = QrCode::new(payload.as_bytes())?;
    let width = code.width();
    let module = QR_SIZE / (width + 2 * QR_QUIET_ZONE) as f32;
    let dark = Rgb(0.0, 0.0, 0.0);

    page.fill_rect(x, y, QR_SIZE, QR_SIZE, Rgb::hex(0xffffff));
    for (i, color) in code.to_colors().into_iter().enumerate() {
        if color != Color::Dark {
            continue;
        }
        let (col, row) = (i % width, i / width);
        let left = x + (col + QR_QUIET_ZONE) as f32 * module;
        // Row 0 is the top of the symbol
        let bottom = y + QR_SIZE - (row + QR_QUIET_ZONE + 1) as f32 * module;
        page.fill_rect(left, bottom, module, module, dark);
    }
    Ok(())
}

pub fn ticket_file_name(booking: &Booking) -> String {
    format!("Ticket_{}.pdf", booking.ticket_number)
}

/// Render the printable one page ticket
pub fn render_ticket(booking: &Booking, boarding_offset: Duration) -> TicketDocument {
    let view = TicketView::new(booking, boarding_offset);

    let blue = Rgb::hex(0x0077b6);
    let navy = Rgb::hex(0x023e8a);
    let yellow = Rgb::hex(0xffde59);
    let pale = Rgb::hex(0xe6f7ff);
    let teal = Rgb::hex(0x00b4d8);
    let class_color = match view.bus_type {
        BusType::Ac => Rgb::hex(0x00b159),
        BusType::NonAc => Rgb::hex(0xff6347),
    };

    let mut page = Page::new();

    // Header band and title
    page.fill_rect(0.0, PAGE_HEIGHT - 160.0, PAGE_WIDTH, 160.0, blue)
        .text(150.0, PAGE_HEIGHT - 100.0, Font::Bold, 26.0, yellow, "Best Bus Ticket Confirmation");

    let (box_x, box_y) = (50.0, 220.0);
    let box_w = PAGE_WIDTH - 100.0;
    let box_h = PAGE_HEIGHT - 240.0 - 160.0;
    page.fill_rect(box_x, box_y, box_w, box_h, pale);

    let fare = format!("Rs. {}", view.total_fare);
    let adults = view.adults.to_string();
    let children = view.children.to_string();
    let rows: [(&str, &str, Rgb); 7] = [
        ("Ticket No", &view.ticket_number, navy),
        ("Passenger Name", &view.passenger_name, Rgb::hex(0xff4500)),
        ("Route", &view.route_name, navy),
        ("Class", view.bus_type.as_str(), class_color),
        ("Adults", &adults, navy),
        ("Children", &children, navy),
        ("Total Fare", &fare, navy),
    ];

    let top = box_y + box_h - 50.0;
    for (i, (label, value, color)) in rows.iter().enumerate() {
        let y = top - i as f32 * 38.0;
        page.text(box_x + 30.0, y, Font::Bold, 12.0, blue, label)
            .text(box_x + 250.0, y, Font::Bold, 12.0, *color, value);
    }

    let boarding = format!("Boarding Time: {}", view.boarding_time.format("%H:%M, %d-%b-%Y"));
    page.fill_rect(box_x + 30.0, box_y + 80.0, 220.0, 30.0, yellow)
        .text(box_x + 40.0, box_y + 90.0, Font::Bold, 10.0, blue, &boarding);

    if let Err(e) = draw_qr(&mut page, &view.qr_payload, box_x + box_w - 150.0, box_y + 30.0) {
        warn!(ticket_number = %view.ticket_number, "QR code not drawn: {}", e);
        page.text(box_x + 30.0, box_y + 60.0, Font::Regular, 7.0, navy, &view.qr_payload);
    }

    page.fill_rect(0.0, box_y - 60.0, PAGE_WIDTH, 120.0, teal)
        .text(
            150.0,
            box_y + 40.0,
            Font::Regular,
            10.0,
            Rgb::hex(0xffffff),
            "Thank you for booking with MyBusPortal! Travel safely.",
        );

    let mut term_y = box_y + 25.0;
    for term in TERMS {
        page.text(box_x + 30.0, term_y, Font::Bold, 8.0, yellow, term);
        term_y -= 12.0;
    }

    TicketDocument {
        file_name: ticket_file_name(booking),
        bytes: page.to_pdf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use busline_core::RouteRef;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn booking() -> Booking {
        Booking {
            id: Uuid::new_v4(),
            name: "Asha Patil".to_string(),
            route: RouteRef {
                id: 1,
                name: "Antop Hill to Goregaon".to_string(),
                bus_type: BusType::Ac,
            },
            adults: 2,
            children: 1,
            email: None,
            booked_at: Utc.with_ymd_and_hms(2025, 6, 1, 9, 45, 10).unwrap(),
            ticket_number: "T202506010945101123".to_string(),
            total_fare: dec!(90.00),
        }
    }

    #[test]
    fn test_boarding_is_half_an_hour_after_booking() {
        let booking = booking();
        let boarding = boarding_time(&booking, Duration::minutes(DEFAULT_BOARDING_OFFSET_MINUTES));
        assert_eq!(boarding, Utc.with_ymd_and_hms(2025, 6, 1, 10, 15, 10).unwrap());
    }

    #[test]
    fn test_qr_payload() {
        let booking = booking();
        let boarding = boarding_time(&booking, Duration::minutes(30));
        assert_eq!(
            qr_payload(&booking, boarding),
            "Ticket:T202506010945101123|Name:Asha Patil|Route:Antop Hill to Goregaon|Class:AC|Seats:2A,1C|Boarding:10:15 01-Jun-2025"
        );
    }

    #[test]
    fn test_render_contains_ticket_details() {
        let document = render_ticket(&booking(), Duration::minutes(30));
        assert_eq!(document.file_name, "Ticket_T202506010945101123.pdf");

        let text = String::from_utf8(document.bytes).unwrap();
        assert!(text.starts_with("%PDF-"));
        assert!(text.contains("(T202506010945101123) Tj"));
        assert!(text.contains("(Asha Patil) Tj"));
        assert!(text.contains("(Rs. 90.00) Tj"));
        assert!(text.contains("(Boarding Time: 10:15, 01-Jun-2025) Tj"));
    }

    #[test]
    fn test_render_draws_qr_modules() {
        let booking = booking();
        let view = TicketView::new(&booking, Duration::minutes(30));
        let code = QrCode::new(view.qr_payload.as_bytes()).unwrap();
        let dark = code.to_colors().into_iter().filter(|c| *c == Color::Dark).count();

        let text = String::from_utf8(render_ticket(&booking, Duration::minutes(30)).bytes).unwrap();
        let modules = text.lines().filter(|l| l.starts_with("0.000 0.000 0.000 rg ")).count();
        assert!(dark > 0);
        assert_eq!(modules, dark);

        // White backing square at the bottom right of the details box
        assert!(text.contains("1.000 1.000 1.000 rg 395.00 250.00 120.00 120.00 re f"));
        // Payload is only printed as text when the code cannot be drawn
        assert!(!text.contains(&format!("({}) Tj", view.qr_payload)));
        assert!(view.qr_svg.unwrap().contains("<svg"));
    }

    #[test]
    fn test_qr_top_left_finder_pattern() {
        let mut page = Page::new();
        draw_qr(&mut page, "Ticket:T1", 0.0, 0.0).unwrap();
        let text = String::from_utf8(page.to_pdf()).unwrap();

        let code = QrCode::new(b"Ticket:T1").unwrap();
        let module = QR_SIZE / (code.width() + 8) as f32;
        // Finder pattern corner sits just inside the quiet zone
        let corner = format!(
            "0.000 0.000 0.000 rg {:.2} {:.2} {:.2} {:.2} re f",
            4.0 * module,
            QR_SIZE - 5.0 * module,
            module,
            module
        );
        assert!(text.contains(&corner));
    }

    #[test]
    fn test_render_keeps_accented_name() {
        let mut booking = booking();
        booking.name = "अनन्या Śarma José".to_string();
        let bytes = render_ticket(&booking, Duration::minutes(30)).bytes;

        let expected: &[u8] = b"(?????? Sarma Jos\xe9) Tj";
        assert!(bytes.windows(expected.len()).any(|w| w == expected));
    }

    #[test]
    fn test_view_formats_fare() {
        let mut booking = booking();
        booking.total_fare = dec!(45);
        let view = TicketView::new(&booking, Duration::minutes(30));
        assert_eq!(view.total_fare, "45.00");
        assert_eq!(view.route, "Antop Hill to Goregaon (AC)");
    }
}
