//! Device table shown while picking a peripheral.
//!
//! ```text
//! #   Manufacturer  Product Description  Bus            Product ID
//! 1.  Logitech      USB Receiver         USB receiver   50504
//! 2.  Logitech      POP Keys             Bluetooth      45083
//! ```

use kamels_core::DeviceIdentity;

const HEADER: [&str; 5] = ["#", "Manufacturer", "Product Description", "Bus", "Product ID"];

/// Renders `devices` as a left-aligned table, one row per device, numbered
/// from 1.  Columns are separated by two spaces and padded to their widest
/// cell.
pub fn render_device_table(devices: &[DeviceIdentity]) -> String {
    let rows: Vec<[String; 5]> = devices
        .iter()
        .enumerate()
        .map(|(i, device)| {
            [
                format!("{}.", i + 1),
                device.manufacturer.clone(),
                device.product.clone(),
                device.transport.to_string(),
                device.product_id.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADER.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADER.map(String::from), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}
