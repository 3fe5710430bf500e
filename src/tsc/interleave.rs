use crate::models::CondensedTable;
use crate::policy::ColumnPolicy;
use crate::Result;

/// Column order that alternates the seat columns: `first1, last1, first2, last2, ...`.
///
/// Seat columns are any whose name contains `first` or `last`. They keep the slots they
/// already occupy, only their assignment to those slots changes, so every other column stays
/// where it was. Two or fewer seat columns are left alone. When one side runs out, the rest of
/// the other side follows in its original order.
pub fn interleave_order(names: &[&str], first: &str, last: &str) -> Vec<usize> {
    let mut order: Vec<usize> = (0..names.len()).collect();

    let slots: Vec<usize> = order
        .iter()
        .copied()
        .filter(|&idx| names[idx].contains(first) || names[idx].contains(last))
        .collect();

    if slots.len() <= 2 {
        return order;
    }

    let (firsts, lasts): (Vec<usize>, Vec<usize>) =
        slots.iter().partition(|&&idx| names[idx].contains(first));

    let mut interleaved = Vec::with_capacity(slots.len());
    let mut lasts = lasts.into_iter();

    for first_idx in firsts {
        interleaved.push(first_idx);

        if let Some(last_idx) = lasts.next() {
            interleaved.push(last_idx);
        }
    }
    interleaved.extend(lasts);

    for (slot, idx) in slots.into_iter().zip(interleaved) {
        order[slot] = idx;
    }

    order
}

/// Reorders the table's seat columns in place, see [`interleave_order`]
pub fn interleave_seats(table: &mut CondensedTable, policy: &ColumnPolicy) -> Result {
    let order = interleave_order(
        &table.column_names(),
        &policy.first_seat_column,
        &policy.last_seat_column,
    );

    if order.iter().enumerate().all(|(slot, &idx)| slot == idx) {
        log::debug!("Seat columns already in order");
        return Ok(());
    }

    table.reorder(&order)?;
    log::debug!("Interleaved seat columns: {:?}", table.column_names());

    return Ok(());
}
