/// Rows above and below the items: border, title, subtitle and padding.
pub const CHROME_ROWS: i32 = 6;

/// First row of the menu surface that is shown on a screen `screen_rows`
/// tall, so that the current item stays visible.
pub fn top_row(item_count: usize, current: usize, screen_rows: i32) -> i32 {
    let needed = item_count as i32 + CHROME_ROWS;
    let current = current as i32;

    if needed <= screen_rows {
        0
    } else if screen_rows + current < needed {
        current
    } else {
        (needed - screen_rows).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_on_screen() {
        assert_eq!(top_row(3, 0, 40), 0);
        assert_eq!(top_row(3, 2, 40), 0);
        assert_eq!(top_row(4, 3, 10), 0);
    }

    #[test]
    fn follows_current_item() {
        assert_eq!(top_row(20, 0, 10), 0);
        assert_eq!(top_row(20, 5, 10), 5);
        assert_eq!(top_row(20, 15, 10), 15);
    }

    #[test]
    fn last_items_pin_the_bottom() {
        assert_eq!(top_row(20, 19, 10), 16);
        assert_eq!(top_row(20, 16, 10), 16);
    }

    #[test]
    fn tiny_screen() {
        assert_eq!(top_row(0, 0, 0), 0);
        assert_eq!(top_row(1, 0, 0), 0);
        assert_eq!(top_row(2, 1, 3), 1);
    }
}
