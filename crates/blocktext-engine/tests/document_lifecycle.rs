use std::cell::RefCell;
use std::rc::Rc;

use blocktext_engine::{
    BlockControllerEvent, BlockControllerEventKind, BlockKind, Consumer, DeltaUpdate, Document,
    DocumentError, LineType, OwnerId, Selection, SheetEventDomain, StoreState,
    build_text_operation, extract_text, get_heading_glyph,
};
use pretty_assertions::assert_eq;

fn host() -> (Consumer, Rc<RefCell<Vec<StoreState>>>) {
    let states = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&states);
    let consumer = Consumer::new(SheetEventDomain::new(), move |state| {
        sink.borrow_mut().push(state.clone())
    });
    (consumer, states)
}

#[test]
fn registering_creates_one_active_text_block() {
    let document = Document::new();
    let (consumer, states) = host();

    document.register_consumer(consumer).unwrap();

    let blocks = document.blocks();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind(), BlockKind::Text);
    let states = states.borrow();
    let last = states.last().unwrap();
    assert_eq!(last.blocks.len(), 1);
    assert_eq!(last.active_block, Some(blocks[0].instance_number()));
}

#[test]
fn backspace_at_origin_merges_into_previous_block() {
    let document = Document::new();
    let (consumer, states) = host();
    document.register_consumer(consumer).unwrap();
    let first = document.active_block().unwrap();
    first.update_delta(DeltaUpdate::new(vec![build_text_operation("Hello", None)]));

    let second = document.insert_block(BlockKind::Text).unwrap();
    second.update_delta(DeltaUpdate::new(vec![build_text_operation(" world", None)]));
    let merged_updates = Rc::new(RefCell::new(Vec::new()));
    {
        let sink = Rc::clone(&merged_updates);
        document.orchestrator().add_block_controller_listener(
            first.owner(),
            first.instance_number(),
            BlockControllerEventKind::DeltaUpdate,
            move |event| {
                let BlockControllerEvent::DeltaUpdate(update) = event;
                sink.borrow_mut().push(update.clone());
            },
        );
    }
    second.set_selection(Selection::collapsed(0));

    assert!(second.press_backspace());

    assert_eq!(document.blocks().len(), 1);
    let active = document.active_block().unwrap();
    assert_eq!(active.instance_number(), first.instance_number());
    assert_eq!(extract_text(&active.delta()), "Hello world");
    assert_eq!(active.selection(), Selection::collapsed(5));

    let merged_updates = merged_updates.borrow();
    assert_eq!(merged_updates.len(), 1);
    assert_eq!(
        merged_updates[0].overriding_selection,
        Some(Selection::collapsed(5))
    );
    assert_eq!(states.borrow().last().unwrap().blocks.len(), 1);
}

#[test]
fn ordered_list_over_three_lines_numbers_them() {
    let document = Document::new();
    let (consumer, _states) = host();
    let domain = consumer.sheet_event_dom().clone();
    let reported = Rc::new(RefCell::new(Vec::new()));
    {
        let sink = Rc::clone(&reported);
        domain.add_selected_line_type_change_listener(
            OwnerId::new(),
            move |line_type| sink.borrow_mut().push(line_type.clone()),
        );
    }
    document.register_consumer(consumer).unwrap();
    let block = document.active_block().unwrap();
    block.update_delta(DeltaUpdate::new(vec![build_text_operation(
        "alpha\nbeta\ngamma\n",
        None,
    )]));
    block.set_selection(Selection::from_bounds(0, 16));

    domain.switch_line_type_in_selection(LineType::Ol);

    let lines = block.lines();
    let ordinals: Vec<usize> = lines.iter().map(|line| line.line_type_index).collect();
    assert_eq!(ordinals, vec![0, 1, 2]);
    assert!(lines.iter().all(|line| line.line_type == LineType::Ol));
    assert_eq!(*reported.borrow(), vec![LineType::Ol]);

    let rendered = lines
        .iter()
        .map(|line| {
            format!(
                "{}{}",
                get_heading_glyph(&line.line_type, line.line_type_index),
                extract_text(&line.delta)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(rendered, @r"
    1.  alpha
    2.  beta
    3.  gamma
    ");
}

#[test]
fn released_document_stops_listening_and_accepts_a_new_consumer() {
    let document = Document::new();
    let (consumer, _states) = host();
    let domain = consumer.sheet_event_dom().clone();
    document.register_consumer(consumer.clone()).unwrap();
    let block = document.active_block().unwrap();
    block.update_delta(DeltaUpdate::new(vec![build_text_operation("text\n", None)]));

    let (intruder, intruder_states) = host();
    assert!(matches!(
        document.register_consumer(intruder),
        Err(DocumentError::ConsumerAlreadyRegistered)
    ));
    assert!(intruder_states.borrow().is_empty());

    document.release_consumer(&consumer).unwrap();
    domain.switch_line_type_in_selection(LineType::Ul);
    assert_eq!(block.lines()[0].line_type, LineType::Normal);
    assert_eq!(document.blocks().len(), 1);

    let (next, next_states) = host();
    document.register_consumer(next).unwrap();
    assert_eq!(document.blocks().len(), 2);
    assert_eq!(next_states.borrow().len(), 1);
}
