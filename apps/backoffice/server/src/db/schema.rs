use rusqlite::{Connection, Result};

/// Accounts, API tokens and the public tour catalogue.
pub fn init_database_main(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Users
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            email TEXT NOT NULL UNIQUE,
            email_verified_at TEXT,
            password TEXT NOT NULL,
            created_at TEXT,
            updated_at TEXT
        );

        -- Bearer tokens (digest only)
        CREATE TABLE IF NOT EXISTS personal_access_tokens (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            token TEXT NOT NULL UNIQUE,
            last_used_at TEXT,
            expires_at TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Destinations
        CREATE TABLE IF NOT EXISTS destinations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            category TEXT,
            description TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Tour packages
        CREATE TABLE IF NOT EXISTS packages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            duration TEXT,
            subtitle TEXT,
            description TEXT,
            inclusions TEXT,
            exclusions TEXT,
            destination_id INTEGER REFERENCES destinations(id) ON DELETE SET NULL,
            package_type TEXT NOT NULL DEFAULT 'single',
            tour_type TEXT,
            frontend_category TEXT,
            image TEXT,
            image_alt TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            featured INTEGER NOT NULL DEFAULT 0,
            display_order INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Destinations of combined packages
        CREATE TABLE IF NOT EXISTS package_destinations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            package_id INTEGER NOT NULL REFERENCES packages(id) ON DELETE CASCADE,
            destination_id INTEGER NOT NULL REFERENCES destinations(id) ON DELETE CASCADE,
            display_order INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_tokens_user ON personal_access_tokens(user_id);
        CREATE INDEX IF NOT EXISTS idx_packages_destination ON packages(destination_id);
        CREATE INDEX IF NOT EXISTS idx_package_destinations_package ON package_destinations(package_id);
        "#,
    )?;

    Ok(())
}

/// Invoicing catalogue, legal documents and tour-operations trackers.
pub fn init_database_invoice(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Invoice line packages
        CREATE TABLE IF NOT EXISTS invoice_package (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sku TEXT,
            quantity INTEGER NOT NULL DEFAULT 1,
            category TEXT,
            items TEXT,
            items_full_details TEXT,
            price REAL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT
        );

        -- Itinerary categories
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_name TEXT NOT NULL,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS subcategories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
            subcategory_name TEXT NOT NULL,
            details TEXT
        );

        -- Invoice terms
        CREATE TABLE IF NOT EXISTS terms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category TEXT NOT NULL,
            details TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Terms and conditions documents
        CREATE TABLE IF NOT EXISTS terms_and_conditions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            pdf_file_path TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Customers and invoices, keyed by invoice number
        CREATE TABLE IF NOT EXISTS customers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            invoice_no TEXT NOT NULL,
            name TEXT,
            email TEXT
        );

        CREATE TABLE IF NOT EXISTS invoices (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            invoice_no TEXT NOT NULL UNIQUE,
            invoice_status TEXT,
            total_price REAL,
            amount_due REAL,
            payment_received REAL
        );

        -- Tour operations
        CREATE TABLE IF NOT EXISTS completed_tours (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tour_id INTEGER,
            assigned_team TEXT NOT NULL,
            followup_status TEXT,
            tail_end TEXT,
            completion_date TEXT,
            notes TEXT,
            customer_assigned INTEGER NOT NULL DEFAULT 0,
            invoice_no TEXT,
            travel_dates TEXT NOT NULL,
            destination TEXT NOT NULL,
            tour_type TEXT NOT NULL,
            days INTEGER NOT NULL,
            pax INTEGER NOT NULL,
            lead_guest TEXT NOT NULL,
            created_at TEXT,
            updated_at TEXT
        );

        CREATE TABLE IF NOT EXISTS cancelled_tours (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tour_id INTEGER,
            cancellation_person TEXT,
            cancellation_reason TEXT,
            refund_status TEXT,
            cancellation_date TEXT NOT NULL,
            days INTEGER NOT NULL,
            pax INTEGER NOT NULL,
            with_coordinator TEXT NOT NULL,
            pickup_point TEXT NOT NULL,
            balance REAL,
            payment_status TEXT NOT NULL,
            accommodation TEXT,
            room_setup TEXT,
            booked_accommodation INTEGER,
            van_details_sent INTEGER,
            assigned_team TEXT,
            status TEXT NOT NULL,
            notes TEXT,
            lead_guest TEXT NOT NULL,
            contact TEXT NOT NULL,
            destination TEXT NOT NULL,
            created_at TEXT,
            updated_at TEXT
        );

        -- ids are assigned by the application (max + 1)
        CREATE TABLE IF NOT EXISTS domestic_tours (
            id INTEGER PRIMARY KEY,
            travel_dates TEXT NOT NULL,
            destination TEXT NOT NULL,
            days INTEGER NOT NULL,
            pax INTEGER NOT NULL,
            lead_guest TEXT NOT NULL,
            contact TEXT NOT NULL,
            pickup_details TEXT,
            balance REAL,
            payment_status TEXT NOT NULL,
            accommodation TEXT,
            booked_accommodation TEXT CHECK (booked_accommodation IN ('YES', 'NO')),
            coordinated_with_supplier TEXT CHECK (coordinated_with_supplier IN ('YES', 'NO')),
            hotel_balance REAL,
            transfer_details_sent TEXT CHECK (transfer_details_sent IN ('YES', 'NO')),
            handled_by TEXT,
            status TEXT NOT NULL,
            notes TEXT,
            created_at TEXT,
            updated_at TEXT
        );

        CREATE TABLE IF NOT EXISTS luzon_exclusive (
            id INTEGER PRIMARY KEY,
            travel_dates TEXT NOT NULL,
            destination TEXT NOT NULL,
            days INTEGER NOT NULL,
            pax INTEGER NOT NULL,
            with_coordinator TEXT NOT NULL,
            lead_guest TEXT NOT NULL,
            contact TEXT NOT NULL,
            pickup_point TEXT NOT NULL,
            balance REAL,
            payment_status TEXT NOT NULL,
            accommodation TEXT,
            room_setup TEXT,
            booked_accommodation TEXT CHECK (booked_accommodation IN ('YES', 'NO')),
            van_details_sent TEXT CHECK (van_details_sent IN ('YES', 'NO')),
            assigned_team TEXT,
            status TEXT NOT NULL,
            notes TEXT,
            created_at TEXT,
            updated_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_subcategories_category ON subcategories(category_id);
        CREATE INDEX IF NOT EXISTS idx_customers_invoice_no ON customers(invoice_no);
        CREATE INDEX IF NOT EXISTS idx_completed_tours_invoice_no ON completed_tours(invoice_no);
        "#,
    )?;

    Ok(())
}

/// Customer terms form: packages, questions and submissions.
pub fn init_database_tnc(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Form packages
        CREATE TABLE IF NOT EXISTS packages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT
        );

        CREATE TABLE IF NOT EXISTS terms_questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            package_id INTEGER NOT NULL,
            question_text TEXT NOT NULL,
            yes_option TEXT NOT NULL,
            no_option TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS submissions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            package_type TEXT NOT NULL,
            email TEXT NOT NULL,
            lead_guest TEXT NOT NULL,
            fb_name TEXT,
            contact_number TEXT NOT NULL,
            payment_date TEXT,
            payment_amount REAL,
            has_payment_receipt INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS companions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            submission_id INTEGER NOT NULL REFERENCES submissions(id) ON DELETE CASCADE,
            full_name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS submission_answers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            submission_id INTEGER NOT NULL REFERENCES submissions(id) ON DELETE CASCADE,
            question_id INTEGER NOT NULL,
            answer TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS payment_receipts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            submission_id INTEGER NOT NULL REFERENCES submissions(id) ON DELETE CASCADE,
            file_name TEXT NOT NULL,
            file_path TEXT NOT NULL,
            file_size INTEGER,
            mime_type TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_terms_questions_package ON terms_questions(package_id);
        CREATE INDEX IF NOT EXISTS idx_companions_submission ON companions(submission_id);
        CREATE INDEX IF NOT EXISTS idx_answers_submission ON submission_answers(submission_id);
        CREATE INDEX IF NOT EXISTS idx_receipts_submission ON payment_receipts(submission_id);
        "#,
    )?;

    Ok(())
}
