use leakscan::game::{Action, Street};
use leakscan::parser::parse;
use leakscan::position::Position;

const MULTI_STREET_HAND: &str = "\
Poker Hand #HX200: Hold'em No Limit ($0.05/$0.10) - 2024/03/15 20:11:42
Table 'Borealis' 6-max Seat #1 is the button
Seat 1: maple ($10.00 in chips)
Seat 2: orion ($12.35 in chips)
Seat 3: Hero ($10.00 in chips)
Seat 4: lumen ($9.40 in chips)
Seat 5: quartz ($8.05 in chips)
Seat 6: rook ($10.00 in chips)
orion: posts small blind $0.05
Hero: posts big blind $0.10
*** HOLE CARDS ***
Dealt to Hero [Qh Qs]
lumen: folds
quartz: raises $0.20 to $0.30
rook: folds
maple: folds
orion: folds
Hero: calls $0.20
*** FLOP *** [Qd 7c 2s]
Hero: checks
quartz: bets $0.40
Hero: raises $0.80 to $1.20
quartz: calls $0.80
*** TURN *** [Qd 7c 2s] [5h]
Hero: bets $2.00
quartz: calls $2.00
*** RIVER *** [Qd 7c 2s 5h] [9d]
Hero: bets $4.00
quartz: folds
Uncalled bet ($4.00) returned to Hero
Hero collected $7.23 from pot
*** SUMMARY ***
Total pot $7.65 | Rake $0.42
Board [Qd 7c 2s 5h 9d]
Seat 3: Hero (big blind) collected ($7.23)
";

#[test]
fn multi_street_hand_round_trips_structure() {
    let outcome = parse(MULTI_STREET_HAND);
    assert_eq!(outcome.skipped_hands, 0);
    assert_eq!(outcome.ignored_action_lines, 0);
    assert_eq!(outcome.hands.len(), 1);

    let hand = &outcome.hands[0];
    assert_eq!(hand.id, "HX200");
    assert_eq!(hand.table_name, "Borealis");
    assert_eq!(hand.small_blind, 0.05);
    assert_eq!(hand.big_blind, 0.10);
    assert_eq!(hand.max_seats, 6);
    assert_eq!(hand.button_seat, 1);
    assert_eq!(hand.players.len(), 6);

    // Button-relative positions for a full 6-max table.
    assert_eq!(hand.player("maple").unwrap().position, Some(Position::Btn));
    assert_eq!(hand.player("orion").unwrap().position, Some(Position::Sb));
    assert_eq!(hand.player("Hero").unwrap().position, Some(Position::Bb));
    assert_eq!(hand.player("lumen").unwrap().position, Some(Position::Utg));
    assert_eq!(hand.player("quartz").unwrap().position, Some(Position::Hj));
    assert_eq!(hand.player("rook").unwrap().position, Some(Position::Co));

    let hero = hand.hero().expect("hero flagged");
    assert_eq!(hero.name, "Hero");
    let cards = hero.hole_cards.expect("hero cards dealt");
    assert_eq!(cards[0].to_string(), "Qh");
    assert_eq!(cards[1].to_string(), "Qs");

    // Blinds plus six voluntary preflop actions.
    assert_eq!(hand.street_actions(Street::Preflop).len(), 8);
    assert_eq!(hand.street_actions(Street::Flop).len(), 4);
    assert_eq!(hand.street_actions(Street::Turn).len(), 2);
    assert_eq!(hand.street_actions(Street::River).len(), 2);

    assert_eq!(hand.board.len(), 5);
    assert_eq!(hand.board[3].to_string(), "5h");
    assert_eq!(hand.board[4].to_string(), "9d");

    assert_eq!(hand.pot, Some(7.65));
    assert_eq!(hand.rake, Some(0.42));
    assert_eq!(hand.winners.get("Hero"), Some(&7.23));
}

#[test]
fn raise_preserves_total_bet_size() {
    let outcome = parse(MULTI_STREET_HAND);
    let hand = &outcome.hands[0];

    let open = hand
        .street_actions(Street::Preflop)
        .iter()
        .find(|e| e.player == "quartz")
        .unwrap();
    assert_eq!(
        open.action,
        Action::Raise {
            amount: 0.20,
            to_amount: 0.30
        }
    );

    let check_raise = &hand.street_actions(Street::Flop)[2];
    assert_eq!(
        check_raise.action,
        Action::Raise {
            amount: 0.80,
            to_amount: 1.20
        }
    );
}

#[test]
fn empty_input_yields_empty_outcome() {
    let outcome = parse("");
    assert!(outcome.hands.is_empty());
    assert_eq!(outcome.skipped_hands, 0);

    let outcome = parse("\n\n  \n");
    assert!(outcome.hands.is_empty());
}

#[test]
fn malformed_header_skips_only_that_hand() {
    let blob = format!(
        "Poker Hand HBAD no colon here\n\
         Table 'X' 6-max Seat #1 is the button\n\
         \n\
         {MULTI_STREET_HAND}"
    );
    let outcome = parse(&blob);
    assert_eq!(outcome.hands.len(), 1);
    assert_eq!(outcome.skipped_hands, 1);
    assert_eq!(outcome.hands[0].id, "HX200");
}

#[test]
fn malformed_table_line_skips_hand() {
    let blob = "\
Poker Hand #H1: Hold'em No Limit ($0.01/$0.02) - 2024/01/01 00:00:00
Tble 'Broken' 6-max Seat #1 is the button
Seat 1: solo ($2.00 in chips)
";
    let outcome = parse(blob);
    assert!(outcome.hands.is_empty());
    assert_eq!(outcome.skipped_hands, 1);
}

#[test]
fn duplicate_seat_skips_hand() {
    let blob = "\
Poker Hand #H1: Hold'em No Limit ($0.01/$0.02) - 2024/01/01 00:00:00
Table 'Dup' 6-max Seat #1 is the button
Seat 1: alpha ($2.00 in chips)
Seat 1: beta ($2.00 in chips)
";
    let outcome = parse(blob);
    assert_eq!(outcome.skipped_hands, 1);
}

#[test]
fn unrecognized_phrasing_is_dropped_and_counted() {
    let blob = "\
Poker Hand #H2: Hold'em No Limit ($0.01/$0.02) - 2024/01/01 00:00:00
Table 'Quiet' 6-max Seat #1 is the button
Seat 1: alpha ($2.00 in chips)
Seat 2: beta ($2.00 in chips)
*** HOLE CARDS ***
alpha: raises $0.04 to $0.06
beta: ponders deeply for a while
beta: folds
";
    let outcome = parse(blob);
    assert_eq!(outcome.hands.len(), 1);
    assert_eq!(outcome.ignored_action_lines, 1);
    assert_eq!(outcome.hands[0].preflop.len(), 2);
}

#[test]
fn undersized_raise_total_does_not_crash() {
    // to_amount below the prior street bet is bad fixture data; the
    // parser records it as-is and keeps going.
    let blob = "\
Poker Hand #H3: Hold'em No Limit ($0.01/$0.02) - 2024/01/01 00:00:00
Table 'Odd' 6-max Seat #1 is the button
Seat 1: alpha ($2.00 in chips)
Seat 2: beta ($2.00 in chips)
*** HOLE CARDS ***
alpha: raises $0.48 to $0.50
beta: raises $0.05 to $0.10
";
    let outcome = parse(blob);
    assert_eq!(outcome.hands.len(), 1);
    let second = &outcome.hands[0].preflop[1];
    assert_eq!(
        second.action,
        Action::Raise {
            amount: 0.05,
            to_amount: 0.10
        }
    );
}

#[test]
fn multiple_hands_split_on_blank_line_boundary() {
    let second = MULTI_STREET_HAND.replace("#HX200", "#HX201");
    let blob = format!("{MULTI_STREET_HAND}\n{second}");
    let outcome = parse(&blob);
    assert_eq!(outcome.hands.len(), 2);
    assert_eq!(outcome.hands[0].id, "HX200");
    assert_eq!(outcome.hands[1].id, "HX201");
}

#[test]
fn alternate_won_phrasing_populates_winners() {
    let blob = "\
Poker Hand #H4: Hold'em No Limit ($0.01/$0.02) - 2024/01/01 00:00:00
Table 'Won' 6-max Seat #1 is the button
Seat 1: alpha ($2.00 in chips)
Seat 2: beta ($2.00 in chips)
*** HOLE CARDS ***
alpha: raises $0.04 to $0.06
beta: folds
*** SUMMARY ***
Total pot $0.09
Seat 1: alpha (button) won ($0.09)
";
    let outcome = parse(blob);
    let hand = &outcome.hands[0];
    assert_eq!(hand.pot, Some(0.09));
    assert_eq!(hand.rake, None);
    assert_eq!(hand.winners.get("alpha"), Some(&0.09));
}

#[test]
fn won_phrasing_keeps_multi_word_names_whole() {
    // The seat grammar admits names with spaces; the winner entry must
    // key on the full seated name, not its first token.
    let blob = "\
Poker Hand #H5: Hold'em No Limit ($0.01/$0.02) - 2024/01/01 00:00:00
Table 'Won' 6-max Seat #1 is the button
Seat 1: John Doe ($2.00 in chips)
Seat 2: beta ($2.00 in chips)
*** HOLE CARDS ***
John Doe: raises $0.04 to $0.06
beta: folds
*** SUMMARY ***
Total pot $0.03
Seat 1: John Doe (button) won ($0.03)
";
    let outcome = parse(blob);
    let hand = &outcome.hands[0];
    assert_eq!(hand.winners.get("John Doe"), Some(&0.03));
    assert!(!hand.winners.contains_key("John"));
}

#[test]
fn dealt_line_for_non_hero_player_does_not_assign_cards() {
    let blob = "\
Poker Hand #H6: Hold'em No Limit ($0.01/$0.02) - 2024/01/01 00:00:00
Table 'Dealt' 6-max Seat #1 is the button
Seat 1: alpha ($2.00 in chips)
Seat 2: beta ($2.00 in chips)
*** HOLE CARDS ***
Dealt to alpha [Ah Kh]
alpha: folds
beta: checks
";
    let outcome = parse(blob);
    let hand = &outcome.hands[0];
    assert!(hand.hero().is_none());
    let alpha = hand.player("alpha").unwrap();
    assert_eq!(alpha.hole_cards, None);
}
