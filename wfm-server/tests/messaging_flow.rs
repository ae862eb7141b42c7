//! Conversations, messages and read receipts

mod common;

use wfm_server::db::models::{ConversationCreate, MessageCreate, Role};
use wfm_server::db::repository::{ConversationRepository, MessageRepository, RepoError};

use common::{mem_db, register_user, user_id};

async fn conversation_between(
    repo: &ConversationRepository,
    ids: Vec<String>,
) -> wfm_server::db::models::Conversation {
    repo.create(ConversationCreate {
        participant_ids: ids,
    })
    .await
    .expect("create conversation")
}

#[tokio::test]
async fn conversation_needs_two_distinct_participants() {
    let db = mem_db().await;
    let a = register_user(&db, "a@example.com", Role::Employee).await;
    let repo = ConversationRepository::new(db.clone());

    let err = repo
        .create(ConversationCreate {
            participant_ids: vec![user_id(&a)],
        })
        .await
        .expect_err("one participant");
    assert!(matches!(err, RepoError::Validation(_)));

    // Duplicates collapse, so the same id twice is still too few
    let err = repo
        .create(ConversationCreate {
            participant_ids: vec![user_id(&a), user_id(&a)],
        })
        .await
        .expect_err("duplicated participant");
    assert!(matches!(err, RepoError::Validation(_)));
}

#[tokio::test]
async fn participant_removal_keeps_the_floor() {
    let db = mem_db().await;
    let a = register_user(&db, "a@example.com", Role::Employee).await;
    let b = register_user(&db, "b@example.com", Role::Employee).await;
    let c = register_user(&db, "c@example.com", Role::Employee).await;
    let repo = ConversationRepository::new(db.clone());

    let conv = conversation_between(&repo, vec![user_id(&a), user_id(&b), user_id(&c)]).await;
    let conv_id = conv.id.as_ref().expect("id").to_string();

    let after = repo
        .remove_participant(&conv_id, &user_id(&c))
        .await
        .expect("remove third");
    assert_eq!(after.participants.len(), 2);

    let err = repo
        .remove_participant(&conv_id, &user_id(&b))
        .await
        .expect_err("would drop below two");
    assert!(matches!(err, RepoError::Validation(_)));
}

#[tokio::test]
async fn sender_must_be_a_participant() {
    let db = mem_db().await;
    let a = register_user(&db, "a@example.com", Role::Employee).await;
    let b = register_user(&db, "b@example.com", Role::Employee).await;
    let outsider = register_user(&db, "x@example.com", Role::Employee).await;
    let conversations = ConversationRepository::new(db.clone());
    let messages = MessageRepository::new(db.clone());

    let conv = conversation_between(&conversations, vec![user_id(&a), user_id(&b)]).await;
    let conv_id = conv.id.as_ref().expect("id").to_string();

    let err = messages
        .send(MessageCreate {
            conversation_id: conv_id.clone(),
            sender_id: user_id(&outsider),
            message: "hello?".to_string(),
            attachments: vec![],
        })
        .await
        .expect_err("outsider cannot send");
    assert!(matches!(err, RepoError::Validation(_)));

    let (stored, total) = messages
        .list_by_conversation(&conv_id, 1, 20)
        .await
        .expect("list");
    assert_eq!(total, 0);
    assert!(stored.is_empty());
}

#[tokio::test]
async fn send_updates_preview_and_unread_counters() {
    let db = mem_db().await;
    let a = register_user(&db, "a@example.com", Role::Employee).await;
    let b = register_user(&db, "b@example.com", Role::Employee).await;
    let conversations = ConversationRepository::new(db.clone());
    let messages = MessageRepository::new(db.clone());

    let conv = conversation_between(&conversations, vec![user_id(&a), user_id(&b)]).await;
    let conv_id = conv.id.as_ref().expect("id").to_string();

    messages
        .send(MessageCreate {
            conversation_id: conv_id.clone(),
            sender_id: user_id(&a),
            message: "first".to_string(),
            attachments: vec![],
        })
        .await
        .expect("send");
    messages
        .send(MessageCreate {
            conversation_id: conv_id.clone(),
            sender_id: user_id(&a),
            message: "second".to_string(),
            attachments: vec![],
        })
        .await
        .expect("send");

    let conv = conversations.require(&conv_id).await.expect("reload");
    assert_eq!(conv.last_message.as_deref(), Some("second"));
    assert!(conv.last_message_at.is_some());
    // Only the receiver's counter moves
    assert_eq!(conv.unread_count.get(&user_id(&b)), Some(&2));
    assert!(conv.unread_count.get(&user_id(&a)).is_none());

    let (stored, total) = messages
        .list_by_conversation(&conv_id, 1, 20)
        .await
        .expect("list");
    assert_eq!(total, 2);
    // Oldest first
    assert_eq!(stored[0].message, "first");
    assert!(!stored[0].is_read);
}

#[tokio::test]
async fn mark_conversation_read_clears_received_messages() {
    let db = mem_db().await;
    let a = register_user(&db, "a@example.com", Role::Employee).await;
    let b = register_user(&db, "b@example.com", Role::Employee).await;
    let outsider = register_user(&db, "x@example.com", Role::Employee).await;
    let conversations = ConversationRepository::new(db.clone());
    let messages = MessageRepository::new(db.clone());

    let conv = conversation_between(&conversations, vec![user_id(&a), user_id(&b)]).await;
    let conv_id = conv.id.as_ref().expect("id").to_string();

    messages
        .send(MessageCreate {
            conversation_id: conv_id.clone(),
            sender_id: user_id(&a),
            message: "ping".to_string(),
            attachments: vec![],
        })
        .await
        .expect("send");

    let err = messages
        .mark_conversation_read(&conv_id, &user_id(&outsider))
        .await
        .expect_err("outsider cannot mark read");
    assert!(matches!(err, RepoError::Validation(_)));

    messages
        .mark_conversation_read(&conv_id, &user_id(&b))
        .await
        .expect("mark read");

    let (stored, _) = messages
        .list_by_conversation(&conv_id, 1, 20)
        .await
        .expect("list");
    assert!(stored.iter().all(|m| m.is_read));

    let conv = conversations.require(&conv_id).await.expect("reload");
    assert_eq!(conv.unread_count.get(&user_id(&b)), Some(&0));
}
