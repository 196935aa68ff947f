use log::warn;

use crate::models::{GradeRecord, Verdict};
use crate::utils::board::GradeBoard;
use crate::utils::query::{classify, format_display_date};

// Falls back to the raw value so one bad row doesn't hide the whole board.
fn display_date(raw: &str) -> String {
    match format_display_date(raw) {
        Ok(date) => date,
        Err(e) => {
            warn!("{}", e);
            raw.to_string()
        }
    }
}

fn marker(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "✅",
        Verdict::Fail => "❌",
    }
}

// Builds the board listing: one line per visible record, with a header and a count footer.
pub fn render_board(board: &GradeBoard) -> String {
    let mut message = String::from("📚 Registro Voti 📚\n");
    if !board.filter().trim().is_empty() {
        message.push_str(&format!("Filtro: \"{}\"\n", board.filter()));
    }
    message.push('\n');

    if board.is_empty() {
        message.push_str("Nessun voto trovato\n");
        return message;
    }

    for record in board.visible() {
        message.push_str(&format!(
            "{} #{} {} | {} | {} | {}\n",
            marker(classify(record.grade)),
            record.id,
            record.student_name,
            record.subject,
            record.grade,
            display_date(&record.grade_date)
        ));
    }
    message.push_str(&format!(
        "\n{} voti mostrati su {}, {} insufficienti\n",
        board.visible().len(),
        board.all().len(),
        board.failing_count()
    ));
    message
}

// Detail view of a single record, used after show, add and edit.
pub fn render_record(record: &GradeRecord) -> String {
    let verdict = classify(record.grade);
    let mut message = format!(
        "Voto #{}\n  Studente: {} (id {})\n  Materia:  {}\n  Voto:     {} {} ({})\n  Data:     {}\n",
        record.id,
        record.student_name,
        record.student_id,
        record.subject,
        record.grade,
        marker(verdict),
        if verdict.is_failing() { "insufficiente" } else { "sufficiente" },
        display_date(&record.grade_date)
    );
    if let Some(created_at) = &record.created_at {
        message.push_str(&format!("  Creato:   {}\n", display_date(created_at)));
    }
    message
}

// One warning line per message.
pub fn render_errors(messages: &[String]) -> String {
    messages
        .iter()
        .map(|m| format!("⚠️ {m}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, name: &str, grade: i64, date: &str) -> GradeRecord {
        GradeRecord {
            id,
            student_id: 42,
            student_name: name.to_string(),
            subject: "Matematica".to_string(),
            grade,
            grade_date: date.to_string(),
            created_at: None,
        }
    }

    #[test]
    fn board_lists_visible_records_with_counts() {
        let mut board = GradeBoard::with_records(vec![
            record(1, "Anna Rossi", 7, "2024-03-05"),
            record(2, "Marco Bianchi", 4, "2024-03-06"),
        ]);
        let all = render_board(&board);
        assert!(all.contains("✅ #1 Anna Rossi | Matematica | 7 | 5 marzo 2024"));
        assert!(all.contains("❌ #2 Marco Bianchi | Matematica | 4 | 6 marzo 2024"));
        assert!(all.contains("2 voti mostrati su 2, 1 insufficienti"));

        board.set_filter("ros");
        let filtered = render_board(&board);
        assert!(filtered.contains("Filtro: \"ros\""));
        assert!(!filtered.contains("Marco"));
        assert!(filtered.contains("1 voti mostrati su 2, 0 insufficienti"));
    }

    #[test]
    fn empty_board_says_so() {
        let board = GradeBoard::new();
        assert!(render_board(&board).contains("Nessun voto trovato"));
    }

    #[test]
    fn bad_dates_are_shown_raw() {
        let board = GradeBoard::with_records(vec![record(1, "Anna", 8, "non una data")]);
        assert!(render_board(&board).contains("| non una data"));
    }

    #[test]
    fn record_detail_includes_verdict() {
        let text = render_record(&record(3, "Luca Verdi", 5, "2025-11-02"));
        assert!(text.contains("Voto #3"));
        assert!(text.contains("insufficiente"));
        assert!(text.contains("2 novembre 2025"));
    }

    #[test]
    fn errors_render_one_per_line() {
        let text = render_errors(&["uno".to_string(), "due".to_string()]);
        assert_eq!(text.lines().count(), 2);
    }
}
